//! Time of day to light colour mapping

use chrono::{Local, NaiveTime, Timelike};

/// Normalised light colour, both fields in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour {
    pub brightness: f64,
    /// 0 is the coolest white, 1 the warmest
    pub temperature: f64,
}

impl Colour {
    pub const fn new(brightness: f64, temperature: f64) -> Self {
        Self {
            brightness,
            temperature,
        }
    }
}

/// Fixed look while the schedule is paused
pub const PAUSED: Colour = Colour::new(1.0, 0.5);
/// Bright and white during the day
pub const DAY: Colour = Colour::new(1.0, 0.0);
/// Very dark and orange in the middle of the night
pub const NIGHT: Colour = Colour::new(0.2, 1.0);

/// Ambient colour for wall-clock time `now`, or [`PAUSED`] if `paused`
pub fn colour_for<T: Timelike>(now: &T, paused: bool) -> Colour {
    if paused {
        return PAUSED;
    }
    let hour = now.hour();
    if hour > 8 && hour < 21 {
        DAY
    } else if hour >= 21 {
        // 21:00 => p = 0.0, midnight => p = 1.0
        let p = f64::from((hour - 21) * 60 + now.minute()) / (3.0 * 60.0);
        Colour::new(1.0 - p * 0.8, p * 0.8 + 0.2)
    } else {
        NIGHT
    }
}

/// Source of the local wall-clock time
pub trait Clock {
    fn now(&self) -> NaiveTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock stuck at one time of day
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}
