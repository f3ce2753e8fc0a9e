use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::temperature::Colour;
use crate::{FIXTURES, HTTP_TIMEOUT, REFERENCE_FIXTURE};

/// Coolest colour temperature in mired
pub const MIRED_MIN: u16 = 153;
/// Warmest colour temperature in mired
pub const MIRED_MAX: u16 = 500;
pub const BRIGHTNESS_MAX: u8 = 255;

/// One push to the fixture group, fields left `None` are not changed
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateUpdate {
    pub on: Option<bool>,
    pub colour: Option<Colour>,
}

impl StateUpdate {
    pub fn colour(colour: Colour) -> Self {
        Self {
            on: None,
            colour: Some(colour),
        }
    }

    pub fn power(on: bool, colour: Colour) -> Self {
        Self {
            on: Some(on),
            colour: Some(colour),
        }
    }
}

/// The fixture group the daemon drives
pub trait LightClient {
    /// Push `update` to every fixture in the group
    fn set_state(&self, update: &StateUpdate) -> anyhow::Result<()>;
    /// Current power flag of the reference fixture
    fn get_on_state(&self) -> anyhow::Result<bool>;
}

/// JSON body of `PUT /lights/{i}/state`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
}

impl From<&StateUpdate> for StateBody {
    fn from(update: &StateUpdate) -> Self {
        Self {
            on: update.on,
            ct: update.colour.map(|c| mired(c.temperature)),
            bri: update.colour.map(|c| brightness(c.brightness)),
        }
    }
}

/// Map normalised colour temperature onto the bridge's mired range, truncating
pub fn mired(temperature: f64) -> u16 {
    (temperature * f64::from(MIRED_MAX - MIRED_MIN) + f64::from(MIRED_MIN)) as u16
}

/// Map normalised brightness onto `0..=255`, truncating
pub fn brightness(brightness: f64) -> u8 {
    (brightness * f64::from(BRIGHTNESS_MAX)) as u8
}

#[derive(Debug, Deserialize)]
struct LightResponse {
    state: PowerState,
}

#[derive(Debug, Deserialize)]
struct PowerState {
    on: bool,
}

/// Hue-style REST bridge
#[derive(Debug)]
pub struct Bridge {
    /// Base url including the api key, without trailing slash
    pub api_url: String,
    agent: ureq::Agent,
}

impl Bridge {
    /// Create a bridge client for `api_url` with the default request timeout
    pub fn new(api_url: &str) -> Self {
        Self::with_timeout(api_url, HTTP_TIMEOUT)
    }

    pub fn with_timeout(api_url: &str, timeout: std::time::Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            api_url: api_url.trim_end_matches('/').to_owned(),
            agent,
        }
    }

    fn light_url(&self, index: u8) -> String {
        format!("{}/lights/{}", self.api_url, index)
    }

    /// Send `body` to a single fixture
    pub fn send(&self, index: u8, body: &StateBody) -> anyhow::Result<()> {
        let url = format!("{}/state", self.light_url(index));
        self.agent
            .put(&url)
            .send_json(body)
            .with_context(|| format!("PUT {url}"))?;
        Ok(())
    }
}

impl LightClient for Bridge {
    fn set_state(&self, update: &StateUpdate) -> anyhow::Result<()> {
        let body = StateBody::from(update);
        let mut first_error = None;
        // Every fixture gets its update even if an earlier one failed
        for index in FIXTURES {
            if let Err(err) = self.send(index, &body) {
                log::debug!("fixture {index}: {err:#}");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn get_on_state(&self) -> anyhow::Result<bool> {
        let url = self.light_url(REFERENCE_FIXTURE);
        let response: LightResponse = self
            .agent
            .get(&url)
            .call()
            .with_context(|| format!("GET {url}"))?
            .into_json()
            .with_context(|| format!("malformed light state from {url}"))?;
        Ok(response.state.on)
    }
}

/// Light client that records every push instead of sending it
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub on: bool,
    pub updates: std::sync::Mutex<Vec<StateUpdate>>,
}

#[cfg(test)]
impl Recorder {
    pub fn updates(&self) -> Vec<StateUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl LightClient for Recorder {
    fn set_state(&self, update: &StateUpdate) -> anyhow::Result<()> {
        self.updates.lock().unwrap().push(*update);
        Ok(())
    }

    fn get_on_state(&self) -> anyhow::Result<bool> {
        Ok(self.on)
    }
}
