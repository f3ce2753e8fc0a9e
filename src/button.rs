//! Single and double click detection for the physical button
//!
//! The debouncer sits idle on the event channel until a press arrives, then waits at most
//! the double click window for a second press. Each logical click pushes exactly one state
//! update to the lights.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::light::{LightClient, StateUpdate};
use crate::state::SharedState;
use crate::temperature::{colour_for, Clock};

/// Raw key event from the input device
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonEvent {
    /// 1 for press, 0 for release, 2 for autorepeat
    pub value: i32,
}

impl ButtonEvent {
    pub const PRESS: Self = Self { value: 1 };
    pub const RELEASE: Self = Self { value: 0 };

    pub fn is_press(&self) -> bool {
        self.value == 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Click {
    Single,
    Double,
}

/// What a classified click did to the shared state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Double click paused the schedule and forced the lights on
    Paused,
    /// Double click while already paused, nothing pushed
    AlreadyPaused,
    /// Single click resumed the schedule
    Unpaused,
    /// Single click switched the lights
    Toggled { on: bool },
}

/// Button state machine, driven by a channel of [`ButtonEvent`]s
pub struct Debouncer<L, C> {
    events: Receiver<ButtonEvent>,
    window: Duration,
    state: Arc<SharedState>,
    lights: Arc<L>,
    clock: C,
}

impl<L: LightClient, C: Clock> Debouncer<L, C> {
    pub fn new(
        events: Receiver<ButtonEvent>,
        window: Duration,
        state: Arc<SharedState>,
        lights: Arc<L>,
        clock: C,
    ) -> Self {
        Self {
            events,
            window,
            state,
            lights,
            clock,
        }
    }

    /// Wait for the next press and classify it.
    ///
    /// Returns `None` once the event channel has hung up with no click pending.
    pub fn next_click(&self) -> Option<Click> {
        // Idle: block until a press
        loop {
            match self.events.recv() {
                Ok(event) if event.is_press() => break,
                Ok(event) => log::trace!("Ignoring button event {:?}", event),
                Err(_) => return None,
            }
        }

        // Awaiting second click
        let deadline = Instant::now() + self.window;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) if event.is_press() => return Some(Click::Double),
                Ok(event) => log::trace!("Ignoring button event {:?}", event),
                Err(RecvTimeoutError::Timeout) => return Some(Click::Single),
                // Device went away mid-window, the first press still counts
                Err(RecvTimeoutError::Disconnected) => return Some(Click::Single),
            }
        }
    }

    /// Apply `click` to the shared state and push the result to the lights
    pub fn handle(&self, click: Click) -> Transition {
        let now = self.clock.now();
        let (transition, update) = match click {
            Click::Double => {
                if self.state.set_paused(true) {
                    log::info!("Double click, NOT pausing already paused schedule");
                    return Transition::AlreadyPaused;
                }
                self.state.set_on(true);
                let colour = colour_for(&now, true);
                log::info!("Double click, pausing schedule, forcing on, colour {colour:?}");
                (Transition::Paused, StateUpdate::power(true, colour))
            }
            Click::Single => {
                let colour = colour_for(&now, false);
                if self.state.set_paused(false) {
                    log::info!("Button press, unpausing schedule with colour {colour:?}");
                    (Transition::Unpaused, StateUpdate::colour(colour))
                } else {
                    let on = self.state.toggle_on();
                    log::info!("Button press, on going from {} to {on}, colour {colour:?}", !on);
                    (Transition::Toggled { on }, StateUpdate::power(on, colour))
                }
            }
        };
        if let Err(err) = self.lights.set_state(&update) {
            log::warn!("Failed to push button state: {err:#}");
        }
        transition
    }

    /// Handle clicks until the event channel hangs up
    pub fn run(self) {
        while let Some(click) = self.next_click() {
            self.handle(click);
        }
        log::warn!("Button event stream ended, button support stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Recorder;
    use crate::temperature::{Colour, FixedClock};
    use chrono::NaiveTime;
    use std::sync::mpsc::{self, Sender};
    use std::thread;

    const WINDOW: Duration = Duration::from_millis(350);

    fn debouncer(
        on: bool,
        paused: bool,
        hour: u32,
    ) -> (
        Sender<ButtonEvent>,
        Debouncer<Recorder, FixedClock>,
        Arc<SharedState>,
        Arc<Recorder>,
    ) {
        let (sender, receiver) = mpsc::channel();
        let state = Arc::new(SharedState::new(on));
        state.set_paused(paused);
        let lights = Arc::new(Recorder::default());
        let clock = FixedClock(NaiveTime::from_hms_opt(hour, 0, 0).unwrap());
        let debouncer = Debouncer::new(
            receiver,
            WINDOW,
            Arc::clone(&state),
            Arc::clone(&lights),
            clock,
        );
        (sender, debouncer, state, lights)
    }

    #[test]
    fn test_single_click_toggles() {
        let (sender, debouncer, state, lights) = debouncer(false, false, 12);
        sender.send(ButtonEvent::PRESS).unwrap();
        sender.send(ButtonEvent::RELEASE).unwrap();
        let start = Instant::now();
        let click = debouncer.next_click();
        assert!(start.elapsed() >= WINDOW);
        assert_eq!(click, Some(Click::Single));
        assert_eq!(debouncer.handle(Click::Single), Transition::Toggled { on: true });
        assert!(state.is_on());
        assert!(!state.is_paused());
        assert_eq!(
            lights.updates(),
            vec![StateUpdate::power(true, Colour::new(1.0, 0.0))]
        );
    }

    #[test]
    fn test_double_click_pauses() {
        let (sender, debouncer, state, lights) = debouncer(false, false, 12);
        let presser = thread::spawn(move || {
            sender.send(ButtonEvent::PRESS).unwrap();
            sender.send(ButtonEvent::RELEASE).unwrap();
            thread::sleep(Duration::from_millis(100));
            sender.send(ButtonEvent::PRESS).unwrap();
            sender.send(ButtonEvent::RELEASE).unwrap();
        });
        debouncer.run();
        presser.join().unwrap();
        assert!(state.is_on());
        assert!(state.is_paused());
        assert_eq!(
            lights.updates(),
            vec![StateUpdate::power(true, Colour::new(1.0, 0.5))]
        );
    }

    #[test]
    fn test_double_click_is_not_delayed() {
        let (sender, debouncer, _state, _lights) = debouncer(false, false, 12);
        sender.send(ButtonEvent::PRESS).unwrap();
        sender.send(ButtonEvent::PRESS).unwrap();
        let start = Instant::now();
        assert_eq!(debouncer.next_click(), Some(Click::Double));
        assert!(start.elapsed() < WINDOW);
    }

    #[test]
    fn test_double_click_while_paused_is_noop() {
        let (_sender, debouncer, state, lights) = debouncer(false, true, 12);
        assert_eq!(debouncer.handle(Click::Double), Transition::AlreadyPaused);
        assert!(state.is_paused());
        assert!(!state.is_on());
        assert!(lights.updates().is_empty());
    }

    #[test]
    fn test_single_click_unpauses_with_ambient_colour() {
        let (sender, debouncer, state, lights) = debouncer(true, true, 23);
        sender.send(ButtonEvent::PRESS).unwrap();
        drop(sender);
        debouncer.run();
        assert!(!state.is_paused());
        assert!(state.is_on());
        let updates = lights.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].on, None);
        let colour = updates[0].colour.unwrap();
        assert_ne!(colour, Colour::new(1.0, 0.5));
        assert!((colour.brightness - (1.0 - 0.8 * 2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_releases_alone_do_nothing() {
        let (sender, debouncer, state, lights) = debouncer(true, false, 3);
        for _ in 0..3 {
            sender.send(ButtonEvent::RELEASE).unwrap();
            sender.send(ButtonEvent { value: 2 }).unwrap();
        }
        drop(sender);
        assert_eq!(debouncer.next_click(), None);
        assert!(state.is_on());
        assert!(lights.updates().is_empty());
    }

    #[test]
    fn test_late_second_press_is_two_single_clicks() {
        let (sender, debouncer, state, lights) = debouncer(false, false, 3);
        let presser = thread::spawn(move || {
            sender.send(ButtonEvent::PRESS).unwrap();
            thread::sleep(WINDOW + Duration::from_millis(200));
            sender.send(ButtonEvent::PRESS).unwrap();
        });
        debouncer.run();
        presser.join().unwrap();
        assert!(!state.is_on());
        assert!(!state.is_paused());
        assert_eq!(
            lights.updates(),
            vec![
                StateUpdate::power(true, Colour::new(0.2, 1.0)),
                StateUpdate::power(false, Colour::new(0.2, 1.0)),
            ]
        );
    }

    #[test]
    fn test_pause_then_unpause() {
        let (sender, debouncer, state, lights) = debouncer(false, false, 12);
        sender.send(ButtonEvent::PRESS).unwrap();
        sender.send(ButtonEvent::PRESS).unwrap();
        sender.send(ButtonEvent::PRESS).unwrap();
        drop(sender);
        debouncer.run();
        assert!(state.is_on());
        assert!(!state.is_paused());
        assert_eq!(
            lights.updates(),
            vec![
                StateUpdate::power(true, Colour::new(1.0, 0.5)),
                StateUpdate::colour(Colour::new(1.0, 0.0)),
            ]
        );
    }
}
