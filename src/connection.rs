//! Serial link lifecycle.
//!
//! [`Connection`] owns at most one open [`SerialLink`]. Dropping it (or
//! calling [`Connection::close`]) always tries to switch the device off
//! before the handle is released.

use crate::constants::{FRAME_SIZE, MAX_LINE_LENGTH};
use crate::error::{EventCodeError, Result};
use crate::frame::{hex_dump, switch_off_frame};
use crate::link::{PortBackend, SerialLink};
use crate::types::ConnectionState;
use log::{debug, info, warn};
use serialport::ClearBuffer;
use std::io::{ErrorKind, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

/// The one serial handle held by a dispatcher
pub struct Connection {
    link: Option<Box<dyn SerialLink>>,
    state: ConnectionState,
    port: Option<String>,
    baud_rate: Option<u32>,
    switch_off: [u8; FRAME_SIZE],
    close_delay: Duration,
    print_tx: bool,
    print_rx: bool,
}

impl Connection {
    /// Create a closed connection that uses `switch_off_opcode` on teardown
    pub fn new(switch_off_opcode: u8, close_delay: Duration) -> Self {
        Self {
            link: None,
            state: ConnectionState::Disconnected,
            port: None,
            baud_rate: None,
            switch_off: switch_off_frame(switch_off_opcode),
            close_delay,
            print_tx: false,
            print_rx: false,
        }
    }

    /// Update the teardown parameters; takes effect on the next close
    pub fn set_teardown(&mut self, switch_off_opcode: u8, close_delay: Duration) {
        self.switch_off = switch_off_frame(switch_off_opcode);
        self.close_delay = close_delay;
    }

    /// Enable/disable debug logging of TX frames and RX lines
    pub fn set_debug_print(&mut self, tx: bool, rx: bool) {
        self.print_tx = tx;
        self.print_rx = rx;
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Device path of the open link
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Effective baud rate of the open link
    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }

    /// Open `path` at `baud_rate`, closing any previous link first.
    ///
    /// Blocks for `settle_delay` after the port opens; the Arduino resets on
    /// open and ignores input until its bootloader hands over.
    pub fn open(
        &mut self,
        backend: &dyn PortBackend,
        path: &str,
        baud_rate: u32,
        settle_delay: Duration,
    ) -> Result<()> {
        self.close();

        info!("Opening {} at {} baud", path, baud_rate);
        self.state = ConnectionState::Connecting;
        let link = match backend.open(path, baud_rate) {
            Ok(link) => link,
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                warn!("Cannot open {}: {}", path, e);
                return Err(match e {
                    e @ EventCodeError::OpenFailed { .. } => e,
                    other => EventCodeError::OpenFailed {
                        port: path.to_string(),
                        reason: other.to_string(),
                    },
                });
            }
        };

        self.link = Some(link);
        self.port = Some(path.to_string());
        self.baud_rate = Some(baud_rate);
        thread::sleep(settle_delay);

        self.state = ConnectionState::Connected;
        info!("Connected to {}", path);
        Ok(())
    }

    /// Switch the device off (best effort) and release the handle.
    ///
    /// Never fails; errors during the switch-off are only logged.
    pub fn close(&mut self) {
        let Some(mut link) = self.link.take() else {
            self.reset_state();
            return;
        };

        if self.state == ConnectionState::Connected {
            let frame = self.switch_off;
            match link.write_all(&frame).and_then(|_| link.flush()) {
                Ok(()) => {
                    if self.print_tx {
                        debug!("Sending:  {}", hex_dump(&frame));
                    }
                    thread::sleep(self.close_delay);
                }
                Err(e) => warn!("Switch-off before close failed: {}", e),
            }
        }

        drop(link);
        if let Some(port) = &self.port {
            info!("Connection to {} closed", port);
        }
        self.reset_state();
    }

    /// Release the handle without writing anything to the device
    pub(crate) fn release(&mut self) {
        self.link = None;
        self.reset_state();
    }

    fn reset_state(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.port = None;
        self.baud_rate = None;
    }

    fn link_mut(&mut self) -> Result<&mut Box<dyn SerialLink>> {
        self.link.as_mut().ok_or(EventCodeError::NotConnected)
    }

    /// Write a complete frame and flush the output buffer
    pub fn write(&mut self, frame: &[u8]) -> Result<()> {
        if self.state == ConnectionState::Disconnected {
            return Err(EventCodeError::NotConnected);
        }
        let print_tx = self.print_tx;
        let link = self.link_mut()?;

        if print_tx {
            debug!("Sending:  {}", hex_dump(frame));
        }
        link.write_all(frame)
            .and_then(|_| link.flush())
            .map_err(|e| match e.kind() {
                ErrorKind::TimedOut => EventCodeError::TimedOut,
                _ => EventCodeError::WriteFailed(e),
            })
    }

    /// Read one `\n` terminated line, waiting at most `timeout`.
    ///
    /// The line is returned without its terminator (`\r\n` or `\n`).
    pub fn read_line(&mut self, timeout: Duration) -> Result<String> {
        let print_rx = self.print_rx;
        let link = self.link_mut()?;
        let deadline = Instant::now() + timeout;

        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(EventCodeError::TimedOut);
            }
            link.set_timeout(Some(remaining))?;
            match link.read(&mut byte) {
                Ok(0) => return Err(EventCodeError::TimedOut),
                Ok(_) if byte[0] == b'\n' => break,
                Ok(_) => {
                    line.push(byte[0]);
                    if line.len() > MAX_LINE_LENGTH {
                        return Err(EventCodeError::InvalidResponse(format!(
                            "no line terminator after {} bytes",
                            line.len()
                        )));
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {
                    return Err(EventCodeError::TimedOut)
                }
                Err(e) => return Err(e.into()),
            }
        }

        if line.last() == Some(&b'\r') {
            line.pop();
        }
        let line = String::from_utf8_lossy(&line).to_string();
        if print_rx {
            debug!("Received: {:?}", line);
        }
        Ok(line)
    }

    /// Set the read timeout of the open link
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.link_mut()?.set_timeout(timeout)
    }

    /// Discard pending input and/or output
    pub fn clear_buffers(&mut self, buffer: ClearBuffer) -> Result<()> {
        self.link_mut()?.clear(buffer)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
