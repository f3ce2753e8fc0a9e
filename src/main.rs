use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use ambient_lights::{
    input, Bridge, Config, Debouncer, LightClient, SharedState, SystemClock, Ticker,
};
use anyhow::Context;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let lights = Arc::new(Bridge::with_timeout(&config.api_url, config.http_timeout));

    let on = lights.get_on_state().context("querying initial light state")?;
    log::info!("Starting with on state {on}");
    let state = Arc::new(SharedState::new(on));

    let (sender, receiver) = mpsc::channel();
    let button = match input::spawn(&config.button, sender)? {
        Some(reader) => {
            let debouncer = Debouncer::new(
                receiver,
                config.double_click_window,
                Arc::clone(&state),
                Arc::clone(&lights),
                SystemClock,
            );
            Some((reader, thread::spawn(move || debouncer.run())))
        }
        None => None,
    };

    log::info!("Schedule running every {}s", config.tick_period.as_secs());
    let ticker = Ticker::new(config.tick_period, state, lights, SystemClock);

    // Button threads end if the device goes away, the schedule keeps going
    if let Some((reader, debouncer)) = button {
        if reader.join().is_err() || debouncer.join().is_err() {
            log::error!("Button thread panicked");
        }
    }
    if ticker.join().is_err() {
        anyhow::bail!("Schedule thread panicked");
    }
    Ok(())
}
