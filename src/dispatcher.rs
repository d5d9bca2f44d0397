use crate::command::parse_command;
use crate::connection::Connection;
use crate::error::{EventCodeError, Result};
use crate::frame::encode_command;
use crate::link::{self, PortBackend, SystemBackend};
use crate::locator;
use crate::types::*;
use chrono::Utc;
use log::{debug, info, warn};
use serialport::ClearBuffer;
use std::fmt;

/// Main event-code interface.
///
/// Owns the configuration and the single serial connection. All calls block
/// until the serial write (and, while opening, the handshake) completes, so
/// commands reach the wire in the order they are issued.
pub struct Dispatcher {
    config: Config,
    connection: Connection,
    backend: Box<dyn PortBackend>,
    last_sent: Option<SentMarker>,
}

impl Dispatcher {
    /// Create a dispatcher using the system serial ports
    pub fn new(config: Config) -> Result<Self> {
        Self::with_backend(config, SystemBackend)
    }

    /// Create a dispatcher that opens ports through `backend`
    pub fn with_backend(config: Config, backend: impl PortBackend + 'static) -> Result<Self> {
        config.validate()?;
        let connection = Connection::new(config.opcodes.switch_off, config.close_delay());
        Ok(Dispatcher {
            config,
            connection,
            backend: Box::new(backend),
            last_sent: None,
        })
    }

    /// List available serial ports
    pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
        link::list_ports()
    }

    /// Candidate paths for the configured port pattern
    pub fn list_candidates(&self) -> Result<Vec<String>> {
        self.backend.candidates(&self.config.port_pattern)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration. Rejected while connected.
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        if self.connection.state() != ConnectionState::Disconnected {
            return Err(EventCodeError::ConfigLocked);
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Enable/disable debug logging for TX/RX
    pub fn set_debug_print(&mut self, tx: bool, rx: bool) {
        self.connection.set_debug_print(tx, rx);
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Port of the open connection
    pub fn port(&self) -> Option<&str> {
        self.connection.port()
    }

    pub fn baud_rate(&self) -> Option<u32> {
        self.connection.baud_rate()
    }

    /// Last command written to the device, with its host timestamp
    pub fn last_sent(&self) -> Option<&SentMarker> {
        self.last_sent.as_ref()
    }

    /// Open the link; returns `false` if no device could be reached.
    ///
    /// See [`Dispatcher::try_open`] for the overrides and the failure reason.
    pub fn open(&mut self, port: Option<&str>, baud_rate: Option<u32>) -> bool {
        match self.try_open(port, baud_rate) {
            Ok(_) => true,
            Err(e) => {
                warn!("Cannot open event-code connection: {}", e);
                false
            }
        }
    }

    /// Open the link and return the device path.
    ///
    /// `port` and `baud_rate` replace the configured values. With `find_port`
    /// enabled the candidates of the port pattern are probed instead of
    /// `port`, and the configuration remembers the device that answered.
    /// The device is reset with a switch-off before this returns.
    pub fn try_open(&mut self, port: Option<&str>, baud_rate: Option<u32>) -> Result<String> {
        self.close();

        let mut config = self.config.clone();
        if let Some(port) = port {
            config.port = port.to_string();
        }
        if let Some(baud_rate) = baud_rate {
            config.baud_rate = baud_rate;
        }
        config.validate()?;
        self.config = config;
        self.connection
            .set_teardown(self.config.opcodes.switch_off, self.config.close_delay());

        let path = if self.config.find_port {
            locator::find_device(&mut self.connection, self.backend.as_ref(), &self.config)?
        } else {
            self.connection.open(
                self.backend.as_ref(),
                &self.config.port,
                self.config.baud_rate,
                self.config.settle_delay(),
            )?;
            self.config.port.clone()
        };
        self.config.port = path.clone();

        if let Err(e) = self.reset_device() {
            self.connection.close();
            return Err(e);
        }
        info!("Event-code device ready on {}", path);
        Ok(path)
    }

    fn reset_device(&mut self) -> Result<()> {
        self.connection.clear_buffers(ClearBuffer::All)?;
        self.send_switch_off()
    }

    /// Switch the device off and close the link. Never fails.
    pub fn close(&mut self) {
        if self.connection.state() != ConnectionState::Disconnected {
            info!("Closing event-code connection");
        }
        self.connection.close();
    }

    /// Encode and write `command`
    pub fn send_command(&mut self, command: &Command) -> Result<()> {
        if !self.connection.is_connected() {
            return Err(EventCodeError::NotConnected);
        }
        let frame = encode_command(&self.config.opcodes, command)?;
        self.connection.write(&frame)?;
        self.last_sent = Some(SentMarker {
            timestamp: Utc::now(),
            command: command.clone(),
        });
        Ok(())
    }

    /// Hold `code` for `duration_ms` (configured default when `None`)
    pub fn send_event_code(&mut self, code: u16, duration_ms: Option<u32>) -> Result<()> {
        let duration_ms = duration_ms.unwrap_or(self.config.duration_ms);
        self.send_command(&Command::SwitchOn { code, duration_ms })?;
        debug!("Sent event code {} for {} ms", code, duration_ms);
        Ok(())
    }

    /// Play `codes` in order, each held for `duration_ms` (configured
    /// sequence default when `None`). An empty sequence sends nothing.
    pub fn send_sequence(&mut self, codes: &[u16], duration_ms: Option<u32>) -> Result<()> {
        if codes.is_empty() {
            return Ok(());
        }
        let duration_ms = duration_ms.unwrap_or(self.config.duration_seq_ms);
        self.send_command(&Command::Sequence {
            codes: codes.to_vec(),
            duration_ms,
        })?;
        debug!("Sent sequence {:?} at {} ms per code", codes, duration_ms);
        Ok(())
    }

    /// Send the start code (configured one when `None`)
    pub fn send_start_code(&mut self, code: Option<u16>, duration_ms: Option<u32>) -> Result<()> {
        let code = code.unwrap_or(self.config.start_code);
        self.send_event_code(code, duration_ms)?;
        debug!("Sent start code {}", code);
        Ok(())
    }

    /// Drop all output lines
    pub fn send_switch_off(&mut self) -> Result<()> {
        self.send_command(&Command::SwitchOff)?;
        debug!("Sent switch off");
        Ok(())
    }

    /// Alias of [`Dispatcher::send_switch_off`]
    pub fn send_stop_code(&mut self) -> Result<()> {
        self.send_switch_off()
    }

    /// Interpret a comma separated command list, e.g. `"211,1000,255,128"`
    pub fn dispatch_text_command(&mut self, text: &str) -> Result<()> {
        debug!("Command list: {}", text);
        match parse_command(text, &self.config)? {
            Command::Sequence { codes, duration_ms } => self.send_sequence(&codes, Some(duration_ms)),
            command => self.send_command(&command),
        }
    }

    /// Send the configured test sequence
    pub fn send_test_sequence(&mut self) -> Result<()> {
        let text = format!(
            "{},{}",
            self.config.opcodes.send_sequence, self.config.test_sequence
        );
        self.dispatch_text_command(&text)
    }
}

impl fmt::Display for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.port(), self.baud_rate()) {
            (Some(port), Some(baud_rate)) => {
                write!(f, "event-code device on {} at {} baud", port, baud_rate)
            }
            _ => write!(f, "event-code device (not connected)"),
        }
    }
}
