//! # Event-Code Bridge
//!
//! A Rust library for sending TTL event codes (triggers) to a data-acquisition
//! system through an Arduino running the event-code firmware. Stimulus
//! software marks the onset of each stimulus with a code so the recording can
//! be aligned with the presentation afterwards.
//!
//! ## Features
//!
//! - Find the event-code Arduino among all attached serial devices via a
//!   vendor id handshake
//! - Send single event codes and code sequences with configurable hold times
//! - Interpret comma separated command lists for scripted tests
//! - Always switch the device off before the link is released
//!
//! ## Example
//!
//! ```no_run
//! use eventcode_bridge::{Config, Dispatcher};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut evc = Dispatcher::new(Config::default())?;
//!     if evc.open(None, None) {
//!         evc.send_event_code(255, Some(10_000))?;
//!         evc.close();
//!     }
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod connection;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod link;
pub mod locator;
pub mod types;

pub use dispatcher::Dispatcher;
pub use error::{EventCodeError, Result};
pub use link::{PortBackend, SerialLink, SystemBackend};
pub use types::*;
