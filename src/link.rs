//! Serial transport seam.
//!
//! The dispatcher talks to the device through [`SerialLink`] and opens links
//! through a [`PortBackend`]. [`SystemBackend`] is the real implementation
//! on top of the `serialport` crate.

use crate::error::{EventCodeError, Result};
use crate::locator;
use serialport::{ClearBuffer, SerialPort};
use std::io::{Read, Write};
use std::time::Duration;

/// Read timeout standing in for "wait indefinitely"
const INDEFINITE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Initial read timeout of a freshly opened port
const OPEN_TIMEOUT: Duration = Duration::from_millis(1000);

/// An open, exclusively owned serial handle
pub trait SerialLink: Read + Write + Send {
    /// Set the read timeout; `None` waits indefinitely
    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;

    /// Discard pending bytes in the input and/or output buffer
    fn clear(&mut self, buffer: ClearBuffer) -> Result<()>;
}

/// Enumerates and opens serial devices
pub trait PortBackend: Send {
    /// Candidate device paths for a glob pattern, in listing order
    fn candidates(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(locator::list_candidates(pattern)?.collect())
    }

    /// Open `path` at `baud_rate`
    fn open(&self, path: &str, baud_rate: u32) -> Result<Box<dyn SerialLink>>;
}

/// Serial backend using the operating system's ports
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBackend;

impl PortBackend for SystemBackend {
    fn open(&self, path: &str, baud_rate: u32) -> Result<Box<dyn SerialLink>> {
        let port = serialport::new(path, baud_rate)
            .timeout(OPEN_TIMEOUT)
            .open()
            .map_err(|e| EventCodeError::OpenFailed {
                port: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(NativeLink { port }))
    }
}

struct NativeLink {
    port: Box<dyn SerialPort>,
}

impl Read for NativeLink {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for NativeLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl SerialLink for NativeLink {
    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.port.set_timeout(timeout.unwrap_or(INDEFINITE_TIMEOUT))?;
        Ok(())
    }

    fn clear(&mut self, buffer: ClearBuffer) -> Result<()> {
        self.port.clear(buffer)?;
        Ok(())
    }
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>> {
    Ok(serialport::available_ports()?)
}
