use std::sync::mpsc;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::light::{LightClient, StateUpdate};
use crate::state::SharedState;
use crate::temperature::{colour_for, Clock};

/// The signals that can be sent to a [`Ticker`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Push the schedule colour now, the period restarts afterwards
    Refresh,
    /// Terminate whole ticker thread
    Terminate,
}

pub type SignalResult = Result<(), mpsc::SendError<Signal>>;

/// Periodic schedule, pushes the ambient colour every `period`
#[derive(Debug)]
pub struct Ticker {
    thread: JoinHandle<()>,
    pub sender: Sender<Signal>,
    pub period: Duration,
}

impl Ticker {
    /// Start the ticker thread, the first push happens immediately
    pub fn new<L, C>(period: Duration, state: Arc<SharedState>, lights: Arc<L>, clock: C) -> Self
    where
        L: LightClient + Send + Sync + 'static,
        C: Clock + Send + 'static,
    {
        // Create sender and receiver to communicate with ticker thread
        let (sender, receiver) = mpsc::channel::<Signal>();

        let thread = thread::spawn(move || loop {
            let colour = colour_for(&clock.now(), state.is_paused());
            log::info!("Schedule loop setting colour to {colour:?}");
            if let Err(err) = lights.set_state(&StateUpdate::colour(colour)) {
                log::warn!("Failed to push schedule colour: {err:#}");
            }

            // Wait for signal or next tick, whichever comes first
            match receiver.recv_timeout(period) {
                Ok(Signal::Refresh) => log::debug!("Schedule refresh requested"),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Ok(Signal::Terminate) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            thread,
            sender,
            period,
        }
    }

    /// Push the schedule colour without waiting for the next tick
    pub fn refresh(&self) -> SignalResult {
        self.sender.send(Signal::Refresh)
    }
    /// Stop the ticker thread
    pub fn terminate(&self) -> SignalResult {
        self.sender.send(Signal::Terminate)
    }
    /// Send a signal to the ticker thread
    pub fn signal(&self, signal: Signal) -> SignalResult {
        self.sender.send(signal)
    }

    /// Block until the ticker thread has ended
    pub fn join(self) -> thread::Result<()> {
        self.thread.join()
    }
}
