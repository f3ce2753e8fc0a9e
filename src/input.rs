//! Button event sources, each forwarding into the debouncer channel from its own thread

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::thread::JoinHandle;

use anyhow::Context;
use evdev::{Device, EventType as InputEventType};
use gpio_cdev::{Chip, EventRequestFlags, EventType, LineEventHandle, LineRequestFlags};

use crate::button::ButtonEvent;
use crate::config::ButtonSource;
use crate::BUTTON_NAMES;

/// Consumer label for the requested GPIO line
const GPIO_CONSUMER: &str = "ambient-lights";

/// If `name` starts with one of the allowed `prefixes`
pub fn is_button(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| name.starts_with(prefix))
}

/// First input device whose name matches `prefixes`
pub fn find_device(prefixes: &[&str]) -> Option<(PathBuf, Device)> {
    evdev::enumerate().find(|(_, device)| {
        device
            .name()
            .map(|name| is_button(name, prefixes))
            .unwrap_or(false)
    })
}

/// Forward key events of `device` until it errors or the receiver hangs up
pub fn spawn_evdev(mut device: Device, sender: Sender<ButtonEvent>) -> JoinHandle<()> {
    thread::spawn(move || loop {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(err) => {
                log::error!("Reading button device failed: {err}");
                return;
            }
        };
        for event in events {
            if event.event_type() != InputEventType::KEY {
                continue;
            }
            if sender.send(ButtonEvent { value: event.value() }).is_err() {
                return;
            }
        }
    })
}

/// Button state for a GPIO edge, the line reads high while pressed
pub fn edge_event(edge: EventType) -> ButtonEvent {
    match edge {
        EventType::RisingEdge => ButtonEvent::PRESS,
        EventType::FallingEdge => ButtonEvent::RELEASE,
    }
}

/// Request edge events on `line` of the GPIO chip at `chip`
pub fn open_gpio(chip: &Path, line: u32) -> anyhow::Result<LineEventHandle> {
    let mut chip =
        Chip::new(chip).with_context(|| format!("opening GPIO chip {}", chip.display()))?;
    // Error will appear here if line is occupied
    let events = chip
        .get_line(line)
        .and_then(|line| {
            line.events(
                LineRequestFlags::INPUT,
                EventRequestFlags::BOTH_EDGES,
                GPIO_CONSUMER,
            )
        })
        .with_context(|| format!("requesting events on GPIO line {line}"))?;
    Ok(events)
}

/// Forward edges of a GPIO line until it errors or the receiver hangs up
pub fn spawn_gpio(events: LineEventHandle, sender: Sender<ButtonEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in events {
            let event = match event {
                Ok(event) => event,
                Err(err) => {
                    log::error!("Reading GPIO button failed: {err}");
                    return;
                }
            };
            if sender.send(edge_event(event.event_type())).is_err() {
                return;
            }
        }
    })
}

/// Start the reader thread for `source`.
///
/// Returns `Ok(None)` when there is no button to read, which is not an error: the daemon
/// keeps running the schedule without it.
pub fn spawn(
    source: &ButtonSource,
    sender: Sender<ButtonEvent>,
) -> anyhow::Result<Option<JoinHandle<()>>> {
    match source {
        ButtonSource::Disabled => {
            log::info!("Button disabled");
            Ok(None)
        }
        ButtonSource::Evdev => match find_device(&BUTTON_NAMES) {
            Some((path, device)) => {
                log::info!(
                    "Running with device {} ({})",
                    path.display(),
                    device.name().unwrap_or("unnamed")
                );
                Ok(Some(spawn_evdev(device, sender)))
            }
            None => {
                log::warn!("No button found");
                Ok(None)
            }
        },
        ButtonSource::Gpio { chip, line } => {
            let events = open_gpio(chip, *line)?;
            log::info!("Running with GPIO line {} on {}", line, chip.display());
            Ok(Some(spawn_gpio(events, sender)))
        }
    }
}
