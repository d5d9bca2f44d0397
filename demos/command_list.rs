//! Command List Example
//!
//! Opens a user selected port and plays a textual command list on it:
//! - Listing the ports matching the device pattern and selecting one
//! - Vendor handshake skipped: the selected port is opened directly
//! - Sending the command list given on the command line, or the configured
//!   test sequence when none is given
//!
//! Usage:
//!   cargo run --example command_list                          # Test sequence
//!   cargo run --example command_list -- "211,1000,255,128"    # Custom list
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug cargo run --example command_list

use eventcode_bridge::{Config, Dispatcher, Result};
use inquire::Select;
use log::info;

/// Pick a port, offering the devices matching the port pattern first and
/// every serial port the system knows about otherwise
fn select_port(evc: &Dispatcher) -> Result<String> {
    let mut choices = evc.list_candidates()?;
    if choices.is_empty() {
        info!(
            "Nothing matches {}, listing all serial ports",
            evc.config().port_pattern
        );
        choices = Dispatcher::list_ports()?
            .into_iter()
            .map(|p| p.port_name)
            .collect();
    }

    if choices.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }
    if choices.len() == 1 {
        return Ok(choices.remove(0));
    }

    Select::new("Select the event-code port:", choices)
        .prompt()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Selection cancelled: {}", e),
            )
            .into()
        })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command_list = std::env::args().nth(1);

    let config = Config {
        find_port: false,
        ..Config::default()
    };
    let mut evc = Dispatcher::new(config)?;
    let port_name = select_port(&evc)?;
    evc.set_debug_print(true, false);

    if !evc.open(Some(&port_name), None) {
        info!("Could not open {}", port_name);
        return Ok(());
    }

    match command_list {
        Some(text) => {
            info!("Sending command list: {}", text);
            evc.dispatch_text_command(&text)?;
        }
        None => {
            info!("Sending test sequence: {}", evc.config().test_sequence);
            evc.send_test_sequence()?;
        }
    }

    evc.close();
    Ok(())
}
