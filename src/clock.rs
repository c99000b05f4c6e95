use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// What a countdown emits: one tick per whole second down to zero, then a
/// single terminal expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    Tick { remaining: u64 },
    Expired,
}

/// A clock event stamped with the countdown generation that produced it.
/// Signals from a cancelled generation are discarded on accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSignal {
    pub epoch: u64,
    pub event: ClockEvent,
}

/// Cancellable one-second countdown.
///
/// Each `start` spawns a sender thread stamped with a fresh epoch; `stop`
/// and `reset` bump the shared epoch so the old thread winds down and any
/// of its in-flight signals fail the [`Clock::accept`] check. All state
/// mutation happens on the accept path in the event loop, never in the
/// sender thread.
pub struct Clock {
    tx: Sender<ClockSignal>,
    epoch: Arc<AtomicU64>,
    active_epoch: u64,
    tick_interval: Duration,
    remaining: u64,
    running: bool,
}

impl Clock {
    /// Production clock ticking once per second into the given event channel.
    pub fn new(tx: Sender<ClockSignal>) -> Self {
        Self::with_interval(tx, Duration::from_secs(1))
    }

    /// Clock with an injectable tick interval, for tests that can't wait
    /// wall-clock seconds.
    pub fn with_interval(tx: Sender<ClockSignal>, tick_interval: Duration) -> Self {
        Self {
            tx,
            epoch: Arc::new(AtomicU64::new(0)),
            active_epoch: 0,
            tick_interval,
            remaining: 0,
            running: false,
        }
    }

    /// Begins a countdown from `duration_secs`. An already-running countdown
    /// is cancelled first; only one may be active per clock.
    pub fn start(&mut self, duration_secs: u64) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.active_epoch = epoch;
        self.remaining = duration_secs;
        self.running = true;

        let live = Arc::clone(&self.epoch);
        let tx = self.tx.clone();
        let interval = self.tick_interval;

        thread::spawn(move || {
            let mut remaining = duration_secs;
            loop {
                thread::sleep(interval);
                if live.load(Ordering::SeqCst) != epoch {
                    break;
                }
                remaining = remaining.saturating_sub(1);
                if tx
                    .send(ClockSignal {
                        epoch,
                        event: ClockEvent::Tick { remaining },
                    })
                    .is_err()
                {
                    break;
                }
                if remaining == 0 {
                    let _ = tx.send(ClockSignal {
                        epoch,
                        event: ClockEvent::Expired,
                    });
                    break;
                }
            }
        });
    }

    /// Cancels any active countdown. Safe to call when not running.
    pub fn stop(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.running = false;
    }

    /// Sets the displayed remaining time without emitting any ticks.
    pub fn reset(&mut self, duration_secs: u64) {
        self.stop();
        self.remaining = duration_secs;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Remaining whole seconds as last observed via `accept`.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Validates a signal against the live countdown generation. Stale
    /// signals (from before a stop/reset/restart) return `None` and must not
    /// mutate anything downstream. Expiry leaves the clock stopped.
    pub fn accept(&mut self, signal: ClockSignal) -> Option<ClockEvent> {
        if !self.running || signal.epoch != self.active_epoch {
            return None;
        }
        match signal.event {
            ClockEvent::Tick { remaining } => {
                self.remaining = remaining;
            }
            ClockEvent::Expired => {
                self.running = false;
                self.remaining = 0;
            }
        }
        Some(signal.event)
    }
}
