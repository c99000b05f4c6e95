use crate::metrics;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Countdown length for a round. The set is closed; anything else is a
/// configuration error at the boundary, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
pub enum GameDuration {
    #[value(name = "15")]
    #[strum(serialize = "15s")]
    Short,
    #[value(name = "30")]
    #[strum(serialize = "30s")]
    Medium,
    #[value(name = "60")]
    #[strum(serialize = "60s")]
    Long,
}

impl GameDuration {
    pub fn secs(self) -> u64 {
        match self {
            GameDuration::Short => 15,
            GameDuration::Medium => 30,
            GameDuration::Long => 60,
        }
    }
}

impl Default for GameDuration {
    fn default() -> Self {
        GameDuration::Medium
    }
}

impl TryFrom<u64> for GameDuration {
    type Error = GameError;

    fn try_from(secs: u64) -> Result<Self, GameError> {
        match secs {
            15 => Ok(GameDuration::Short),
            30 => Ok(GameDuration::Medium),
            60 => Ok(GameDuration::Long),
            other => Err(GameError::InvalidDuration(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Duration outside the enumerated {15, 30, 60} set.
    InvalidDuration(u64),
    /// Duration may only change while the session is idle.
    DurationLocked,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidDuration(secs) => {
                write!(f, "invalid round duration {}s (expected 15, 30 or 60)", secs)
            }
            GameError::DurationLocked => {
                write!(f, "round duration can only be changed before typing starts")
            }
        }
    }
}

impl Error for GameError {}

/// Frozen outcome of one round, produced exactly once at finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub wpm: u64,
    pub accuracy: u8,
    pub mistakes: u32,
    pub duration: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Finished,
}

/// What an input change did, so the caller can drive the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputUpdate {
    /// First character of the round arrived; the countdown should start.
    pub started: bool,
    /// The buffer covered the whole phrase; the round should finish.
    pub completed: bool,
}

/// One round of the typing game: target phrase, what has been typed so far,
/// the mistake tally, and live metrics.
#[derive(Debug, Clone)]
pub struct Session {
    phrase: String,
    input: String,
    mistakes: u32,
    duration: GameDuration,
    seconds_remaining: u64,
    state: SessionState,
    wpm: u64,
    accuracy: u8,
    result: Option<RoundResult>,
}

impl Session {
    pub fn new(phrase: String, duration: GameDuration) -> Self {
        Self {
            phrase,
            input: String::new(),
            mistakes: 0,
            duration,
            seconds_remaining: duration.secs(),
            state: SessionState::Idle,
            wpm: 0,
            accuracy: 100,
            result: None,
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn duration(&self) -> GameDuration {
        self.duration
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn wpm(&self) -> u64 {
        self.wpm
    }

    pub fn accuracy(&self) -> u8 {
        self.accuracy
    }

    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    fn elapsed_secs(&self) -> u64 {
        self.duration
            .secs()
            .saturating_sub(self.seconds_remaining)
            .max(1)
    }

    fn refresh_metrics(&mut self) {
        self.accuracy = metrics::accuracy(&self.phrase, &self.input);
        self.wpm = metrics::wpm(&self.input, self.elapsed_secs());
    }

    /// Tears the round down to Idle with a fresh phrase. Valid from any
    /// state; keeps the previous duration unless a new one is given.
    pub fn reset(&mut self, phrase: String, duration: Option<GameDuration>) {
        if let Some(d) = duration {
            self.duration = d;
        }
        self.phrase = phrase;
        self.input.clear();
        self.mistakes = 0;
        self.seconds_remaining = self.duration.secs();
        self.state = SessionState::Idle;
        self.wpm = 0;
        self.accuracy = 100;
        self.result = None;
    }

    /// Changing the countdown length is only allowed before the round starts.
    pub fn set_duration(&mut self, duration: GameDuration) -> Result<(), GameError> {
        if self.state != SessionState::Idle {
            return Err(GameError::DurationLocked);
        }
        self.duration = duration;
        self.seconds_remaining = duration.secs();
        Ok(())
    }

    /// Replaces the input buffer with `new_buffer`.
    ///
    /// The mistake counter moves only when the buffer grew by exactly one
    /// character and that final character mismatches the phrase (or falls
    /// past its end). Corrections never decrement it and edits to earlier
    /// characters never recount it.
    pub fn on_input(&mut self, new_buffer: &str) -> InputUpdate {
        let mut update = InputUpdate::default();

        match self.state {
            SessionState::Finished => return update,
            SessionState::Idle => {
                if new_buffer.is_empty() {
                    return update;
                }
                self.state = SessionState::Running;
                update.started = true;
            }
            SessionState::Running => {}
        }

        let old_len = self.input.chars().count();
        let new_len = new_buffer.chars().count();
        if new_len == old_len + 1 {
            let idx = new_len - 1;
            let typed = new_buffer.chars().nth(idx);
            let expected = self.phrase.chars().nth(idx);
            if typed != expected {
                self.mistakes += 1;
            }
        }

        self.input = new_buffer.to_string();
        self.refresh_metrics();

        if new_len >= self.phrase.chars().count() {
            update.completed = true;
        }
        update
    }

    /// Ticks the round's remaining time. Ignored outside Running.
    pub fn on_tick(&mut self, remaining: u64) {
        if self.state != SessionState::Running {
            return;
        }
        self.seconds_remaining = remaining;
        self.refresh_metrics();
    }

    /// Running -> Finished, freezing the result. Calling it again (the
    /// full-match and timer-expiry paths can both fire in one tick) is a
    /// no-op returning the already-frozen result.
    pub fn finish(&mut self, time_up: bool) -> Option<&RoundResult> {
        match self.state {
            SessionState::Idle => return None,
            SessionState::Finished => return self.result.as_ref(),
            SessionState::Running => {}
        }

        if time_up {
            self.seconds_remaining = 0;
        }
        self.refresh_metrics();
        self.state = SessionState::Finished;
        self.result = Some(RoundResult {
            wpm: self.wpm,
            accuracy: self.accuracy,
            mistakes: self.mistakes,
            duration: self.duration.secs(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        self.result.as_ref()
    }

    pub fn has_finished(&self) -> bool {
        self.state == SessionState::Finished
    }
}
