use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::thread;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::clock::ClockSignal;
use crate::session::RoundResult;

/// Unified event type consumed by the app loop. Key presses, clock signals
/// and background fetch results are serialized onto one channel so every
/// state transition happens on the loop thread.
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    Clock(ClockSignal),
    /// Stored rounds fetched off-loop; a slow or dead backend only delays
    /// this event, never input handling.
    History(Vec<RoundResult>),
}

/// Single-consumer event channel fed by the terminal reader thread and the
/// clock.
pub struct EventBus {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Raw sender, used by tests to inject events.
    pub fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }

    /// A sender the clock can feed; its signals are bridged onto the bus.
    pub fn clock_sender(&self) -> Sender<ClockSignal> {
        let (ctx, crx) = mpsc::channel();
        let tx = self.tx.clone();
        thread::spawn(move || {
            for signal in crx {
                if tx.send(GameEvent::Clock(signal)).is_err() {
                    break;
                }
            }
        });
        ctx
    }

    /// Spawns the crossterm reader thread feeding key and resize events.
    pub fn spawn_input_reader(&self) {
        let tx = self.tx.clone();
        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(GameEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(GameEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });
    }

    /// Blocks for the next event.
    pub fn recv(&self) -> Result<GameEvent, RecvError> {
        self.rx.recv()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
