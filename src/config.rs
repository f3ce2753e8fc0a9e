//! Daemon configuration from environment variables

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};

use crate::{DOUBLE_CLICK_WINDOW, HTTP_TIMEOUT, TICK_PERIOD};

pub const API_URL_VAR: &str = "LIGHTS_API_URL";
pub const TICK_SECS_VAR: &str = "LIGHTS_TICK_SECS";
pub const HTTP_TIMEOUT_VAR: &str = "LIGHTS_HTTP_TIMEOUT_MS";
pub const BUTTON_VAR: &str = "LIGHTS_BUTTON";

/// Where button events come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonSource {
    /// First input device with an allow-listed name
    Evdev,
    /// Push button on a GPIO line, pressed on the rising edge
    Gpio { chip: PathBuf, line: u32 },
    /// Run the schedule only
    Disabled,
}

impl FromStr for ButtonSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evdev" => Ok(Self::Evdev),
            "none" => Ok(Self::Disabled),
            _ => {
                let Some(gpio) = s.strip_prefix("gpio:") else {
                    bail!("unknown button source {s:?}, expected evdev, none or gpio:<chip>:<line>");
                };
                let Some((chip, line)) = gpio.rsplit_once(':') else {
                    bail!("gpio button source {s:?} is missing the line number");
                };
                let line = line
                    .parse::<u32>()
                    .with_context(|| format!("invalid gpio line {line:?}"))?;
                Ok(Self::Gpio {
                    chip: PathBuf::from(chip),
                    line,
                })
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Bridge base url including the api key
    pub api_url: String,
    pub tick_period: Duration,
    pub http_timeout: Duration,
    pub double_click_window: Duration,
    pub button: ButtonSource,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from `lookup`, which returns the value of a variable if set
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(api_url) = lookup(API_URL_VAR) else {
            bail!("{API_URL_VAR} is not set");
        };
        let api_url = api_url.trim().trim_end_matches('/').to_owned();
        if api_url.is_empty() {
            bail!("{API_URL_VAR} is empty");
        }

        let tick_period = match lookup(TICK_SECS_VAR) {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid {TICK_SECS_VAR} {secs:?}"))?,
            ),
            None => TICK_PERIOD,
        };
        if tick_period.is_zero() {
            bail!("{TICK_SECS_VAR} must be at least 1");
        }

        let http_timeout = match lookup(HTTP_TIMEOUT_VAR) {
            Some(millis) => Duration::from_millis(
                millis
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid {HTTP_TIMEOUT_VAR} {millis:?}"))?,
            ),
            None => HTTP_TIMEOUT,
        };

        let button = match lookup(BUTTON_VAR) {
            Some(source) => source
                .trim()
                .parse::<ButtonSource>()
                .with_context(|| format!("invalid {BUTTON_VAR}"))?,
            None => ButtonSource::Evdev,
        };

        Ok(Self {
            api_url,
            tick_period,
            http_timeout,
            double_click_window: DOUBLE_CLICK_WINDOW,
            button,
        })
    }
}
