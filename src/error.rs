//! Error types for event-code bridge operations.

use thiserror::Error;

/// Result type alias for event-code operations.
pub type Result<T> = std::result::Result<T, EventCodeError>;

/// Error types for event-code device communication.
#[derive(Error, Debug)]
pub enum EventCodeError {
    /// Serial port could not be opened (busy, permission denied, missing)
    #[error("Failed to open {port}: {reason}")]
    OpenFailed {
        /// Device path that failed to open
        port: String,
        /// Reason reported by the serial stack
        reason: String,
    },

    /// Operation attempted while the link is closed
    #[error("Not connected to event-code device")]
    NotConnected,

    /// Writing a frame to an open link failed
    #[error("Write failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// No reply within the read timeout
    #[error("Communication timeout")]
    TimedOut,

    /// Textual command could not be interpreted
    #[error("Bad command: {0}")]
    BadCommand(String),

    /// Sequence does not fit the single count byte
    #[error("Sequence too long: {count} codes (max 127)")]
    SequenceTooLong {
        /// Number of codes requested
        count: usize,
    },

    /// Device answered the probe with a different vendor id
    #[error("Vendor id mismatch: expected {expected}, got {actual}")]
    VendorMismatch {
        /// Configured vendor id
        expected: u8,
        /// Value the device replied with
        actual: i64,
    },

    /// Reply to the probe was not an integer line
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No candidate port identified as the event-code device
    #[error("No event-code device found for pattern {pattern} ({candidates} candidates tried)")]
    NoDeviceFound {
        /// Glob pattern that was scanned
        pattern: String,
        /// Number of candidate paths probed
        candidates: usize,
    },

    /// Configuration violates a protocol invariant
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration change attempted while connected
    #[error("Configuration cannot change while connected")]
    ConfigLocked,

    /// Device path pattern is not a valid glob
    #[error("Invalid port pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Serial port communication error
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
