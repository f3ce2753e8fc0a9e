use std::time::Duration;

/// Window after a first press in which a second press makes a double click
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(350);
/// Period of the ambient colour schedule
pub const TICK_PERIOD: Duration = Duration::from_secs(60 * 5);
/// The timeout for each HTTP request to the bridge
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Fixture indices that every state push is sent to
pub const FIXTURES: [u8; 5] = [0, 1, 2, 3, 4];
/// Fixture queried for the on/off flag at startup
pub const REFERENCE_FIXTURE: u8 = 1;

/// Name prefixes of input devices accepted as the button
pub const BUTTON_NAMES: [&str; 2] = ["ThinkPad Extra Buttons", "Puck.js"];

pub mod temperature;
pub use temperature::{colour_for, Clock, Colour, SystemClock};

pub mod state;
pub use state::SharedState;

pub mod light;
pub use light::{Bridge, LightClient, StateUpdate};

pub mod button;
pub use button::{ButtonEvent, Click, Debouncer, Transition};

pub mod timer;
pub use timer::{Signal, Ticker};

pub mod input;

pub mod config;
pub use config::{ButtonSource, Config};
