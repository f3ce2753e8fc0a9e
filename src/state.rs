//! On/off and pause flags shared by the button and schedule loops

use std::sync::atomic::{AtomicBool, Ordering};

/// Process state, shared behind an `Arc`.
///
/// Each flag is atomic on its own; nothing orders the two flags relative to each other.
#[derive(Debug, Default)]
pub struct SharedState {
    on: AtomicBool,
    paused: AtomicBool,
}

impl SharedState {
    /// Create state with the fixture group's current power flag, schedule not paused
    pub fn new(on: bool) -> Self {
        Self {
            on: AtomicBool::new(on),
            paused: AtomicBool::new(false),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    pub fn set_on(&self, on: bool) {
        self.on.store(on, Ordering::SeqCst);
    }

    /// Flip the power flag, returns the new value
    pub fn toggle_on(&self) -> bool {
        !self.on.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Set the pause flag, returns the previous value
    pub fn set_paused(&self, paused: bool) -> bool {
        self.paused.swap(paused, Ordering::SeqCst)
    }
}
