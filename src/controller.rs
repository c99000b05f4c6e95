use crate::clock::{Clock, ClockEvent, ClockSignal};
use crate::corpus::Corpus;
use crate::session::{GameDuration, GameError, RoundResult, Session};

/// Receives the single finalized result of a round. The consumer is where
/// display and best-effort persistence hang off the engine.
pub trait ResultConsumer {
    fn on_finish(&mut self, result: &RoundResult);
}

/// Consumer that drops results, for headless use.
pub struct NullConsumer;

impl ResultConsumer for NullConsumer {
    fn on_finish(&mut self, _result: &RoundResult) {}
}

/// Glues the clock, session and corpus together and sequences round
/// completion. Exactly one result is forwarded to the consumer per round,
/// whether the round ends by full match or by timer expiry.
pub struct SessionController {
    session: Session,
    clock: Clock,
    corpus: Corpus,
    consumer: Box<dyn ResultConsumer>,
}

impl SessionController {
    pub fn new(
        mut clock: Clock,
        corpus: Corpus,
        duration: GameDuration,
        consumer: Box<dyn ResultConsumer>,
    ) -> Self {
        let phrase = corpus.pick_random().to_string();
        clock.reset(duration.secs());
        Self {
            session: Session::new(phrase, duration),
            clock,
            corpus,
            consumer,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replaces the whole input buffer, starting the round (and the
    /// countdown) on the first character. A buffer covering the phrase
    /// finishes the round synchronously, ahead of any queued expiry.
    pub fn on_user_input(&mut self, text: &str) {
        if self.session.has_finished() {
            return;
        }
        let update = self.session.on_input(text);
        if update.started {
            self.clock.start(self.session.duration().secs());
        }
        if update.completed {
            self.finish(false);
        }
    }

    /// Appends one typed character to the buffer.
    pub fn type_char(&mut self, c: char) {
        let mut buffer = self.session.input().to_string();
        buffer.push(c);
        self.on_user_input(&buffer);
    }

    /// Removes the last character from the buffer, if any.
    pub fn backspace(&mut self) {
        let mut buffer = self.session.input().to_string();
        if buffer.pop().is_some() {
            self.on_user_input(&buffer);
        }
    }

    /// Feeds a clock signal through the epoch guard. Stale signals from a
    /// cancelled countdown are dropped without touching the session.
    pub fn handle_clock(&mut self, signal: ClockSignal) {
        match self.clock.accept(signal) {
            Some(ClockEvent::Tick { remaining }) => self.session.on_tick(remaining),
            Some(ClockEvent::Expired) => self.finish(true),
            None => {}
        }
    }

    /// Abandons the current round and deals a fresh phrase. Valid from any
    /// state; the old countdown generation is invalidated.
    pub fn try_again(&mut self) {
        self.clock.stop();
        let phrase = self.corpus.pick_random().to_string();
        self.session.reset(phrase, None);
        self.clock.reset(self.session.duration().secs());
    }

    /// Changes the round length. Rejected once the round is underway.
    pub fn set_duration(&mut self, duration: GameDuration) -> Result<(), GameError> {
        self.session.set_duration(duration)?;
        self.clock.reset(duration.secs());
        Ok(())
    }

    fn finish(&mut self, time_up: bool) {
        if self.session.has_finished() {
            return;
        }
        self.clock.stop();
        if let Some(result) = self.session.finish(time_up) {
            self.consumer.on_finish(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use assert_matches::assert_matches;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    struct RecordingConsumer {
        results: Rc<RefCell<Vec<RoundResult>>>,
    }

    impl ResultConsumer for RecordingConsumer {
        fn on_finish(&mut self, result: &RoundResult) {
            self.results.borrow_mut().push(result.clone());
        }
    }

    fn controller(
        phrase: &str,
        duration: GameDuration,
    ) -> (
        SessionController,
        Receiver<ClockSignal>,
        Rc<RefCell<Vec<RoundResult>>>,
    ) {
        let (tx, rx) = mpsc::channel();
        let clock = Clock::with_interval(tx, Duration::from_millis(2));
        let corpus = Corpus::new(vec![phrase.to_string()]);
        let results = Rc::new(RefCell::new(vec![]));
        let consumer = RecordingConsumer {
            results: Rc::clone(&results),
        };
        let ctrl = SessionController::new(clock, corpus, duration, Box::new(consumer));
        (ctrl, rx, results)
    }

    fn type_phrase(ctrl: &mut SessionController, phrase: &str) {
        for c in phrase.chars() {
            ctrl.type_char(c);
        }
    }

    #[test]
    fn full_match_emits_exactly_one_result() {
        let (mut ctrl, rx, results) = controller("hi there", GameDuration::Medium);
        type_phrase(&mut ctrl, "hi there");

        assert!(ctrl.session().has_finished());
        assert_eq!(results.borrow().len(), 1);

        // Any signals still queued from the cancelled countdown are stale
        // and must not produce a second emission.
        std::thread::sleep(Duration::from_millis(30));
        while let Ok(signal) = rx.try_recv() {
            ctrl.handle_clock(signal);
        }
        assert_eq!(results.borrow().len(), 1);
    }

    #[test]
    fn timer_expiry_emits_exactly_one_result() {
        let (mut ctrl, rx, results) = controller("far too much to type", GameDuration::Short);
        ctrl.type_char('f');

        while !ctrl.session().has_finished() {
            let signal = rx
                .recv_timeout(Duration::from_millis(500))
                .expect("countdown should keep ticking");
            ctrl.handle_clock(signal);
        }

        assert_eq!(results.borrow().len(), 1);
        let result = results.borrow()[0].clone();
        assert_eq!(result.duration, 15);
        assert_eq!(ctrl.session().seconds_remaining(), 0);

        // Drain whatever is left; the round stays finished with one result.
        while let Ok(signal) = rx.try_recv() {
            ctrl.handle_clock(signal);
        }
        assert_eq!(results.borrow().len(), 1);
    }

    #[test]
    fn result_reflects_typed_input() {
        let (mut ctrl, _rx, results) = controller("hello", GameDuration::Medium);
        type_phrase(&mut ctrl, "helko");
        // backspace after finish must not change anything
        ctrl.backspace();

        let result = results.borrow()[0].clone();
        assert_eq!(result.mistakes, 1);
        assert_eq!(result.accuracy, 80);
        assert_eq!(ctrl.session().input(), "helko");
    }

    #[test]
    fn backspace_edits_the_buffer() {
        let (mut ctrl, _rx, _results) = controller("hello", GameDuration::Medium);
        ctrl.type_char('h');
        ctrl.type_char('x');
        ctrl.backspace();

        assert_eq!(ctrl.session().input(), "h");
        assert_eq!(ctrl.session().mistakes(), 1);
    }

    #[test]
    fn try_again_restarts_from_any_state() {
        let (mut ctrl, rx, results) = controller("hi", GameDuration::Short);

        // From Idle
        ctrl.try_again();
        assert_eq!(ctrl.session().state(), SessionState::Idle);

        // From Running
        ctrl.type_char('h');
        ctrl.try_again();
        assert_eq!(ctrl.session().state(), SessionState::Idle);
        assert_eq!(ctrl.session().input(), "");
        assert_eq!(ctrl.session().seconds_remaining(), 15);

        // From Finished
        type_phrase(&mut ctrl, "hi");
        assert!(ctrl.session().has_finished());
        ctrl.try_again();
        assert_eq!(ctrl.session().state(), SessionState::Idle);
        assert_eq!(results.borrow().len(), 1);

        // Ticks left over from abandoned rounds never touch the new one.
        std::thread::sleep(Duration::from_millis(30));
        while let Ok(signal) = rx.try_recv() {
            ctrl.handle_clock(signal);
        }
        assert_eq!(ctrl.session().state(), SessionState::Idle);
        assert_eq!(ctrl.session().seconds_remaining(), 15);
    }

    #[test]
    fn duration_changes_only_while_idle() {
        let (mut ctrl, _rx, _results) = controller("hello", GameDuration::Short);
        ctrl.set_duration(GameDuration::Long).unwrap();
        assert_eq!(ctrl.session().seconds_remaining(), 60);

        ctrl.type_char('h');
        assert_matches!(
            ctrl.set_duration(GameDuration::Short),
            Err(GameError::DurationLocked)
        );
    }

    #[test]
    fn input_after_finish_is_ignored() {
        let (mut ctrl, _rx, results) = controller("hi", GameDuration::Short);
        type_phrase(&mut ctrl, "hi");
        ctrl.type_char('x');

        assert_eq!(ctrl.session().input(), "hi");
        assert_eq!(results.borrow().len(), 1);
    }
}
