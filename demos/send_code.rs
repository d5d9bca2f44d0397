//! Send Code Example
//!
//! Finds the event-code Arduino, holds one event code for ten seconds and
//! closes the connection again.
//!
//! Usage:
//!   cargo run --example send_code                    # Auto-detect port
//!   cargo run --example send_code -- /dev/ttyACM1    # Specify port
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug cargo run --example send_code

use eventcode_bridge::{Config, Dispatcher, Result};
use log::{error, info};
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize logger with default info level if RUST_LOG is not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = Config::default();
    let port = std::env::args().nth(1);
    if port.is_some() {
        config.find_port = false;
    }

    let mut evc = Dispatcher::new(config)?;
    evc.set_debug_print(true, true);

    if !evc.open(port.as_deref(), None) {
        error!("Cannot send event code: no device");
        return Ok(());
    }
    info!("Connected: {}", evc);

    let code = 255;
    let hold = Duration::from_secs(10);
    info!("Sending event code {} for {} s", code, hold.as_secs());
    evc.send_event_code(code, Some(hold.as_millis() as u32))?;
    thread::sleep(hold);

    if let Some(marker) = evc.last_sent() {
        info!("Last marker sent at {}", marker.timestamp.format("%H:%M:%S%.3f"));
    }

    evc.close();
    info!("Done");
    Ok(())
}
