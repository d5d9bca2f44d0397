use crate::constants::*;
use crate::error::{EventCodeError, Result};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Command opcodes understood by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Opcodes {
    pub switch_on: u8,
    pub switch_off: u8,
    pub send_sequence: u8,
}

impl Default for Opcodes {
    fn default() -> Self {
        Self {
            switch_on: SWITCH_ON_CMD,
            switch_off: SWITCH_OFF_CMD,
            send_sequence: SEND_SEQ_CMD,
        }
    }
}

/// Protocol parameters for one event-code device.
///
/// Fixed for the lifetime of a connection: the dispatcher refuses changes
/// while the link is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port opened directly when `find_port` is off
    pub port: String,
    pub baud_rate: u32,
    /// Glob pattern for auto-discovery
    pub port_pattern: String,
    pub find_port: bool,
    /// Default hold time of an event code
    pub duration_ms: u32,
    /// Default hold time of each code in a sequence
    pub duration_seq_ms: u32,
    pub start_code: u16,
    pub vendor_id_code: u8,
    pub vendor_id_repetition: usize,
    pub opcodes: Opcodes,
    /// Duration followed by codes, sent by `send_test_sequence`
    pub test_sequence: String,
    pub settle_delay_ms: u64,
    pub handshake_timeout_ms: u64,
    pub close_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: BAUD_RATE,
            port_pattern: DEFAULT_PORT_PATTERN.to_string(),
            find_port: true,
            duration_ms: DURATION_MS,
            duration_seq_ms: DURATION_SEQ_MS,
            start_code: START_CODE,
            vendor_id_code: VENDOR_ID_CODE,
            vendor_id_repetition: VENDOR_ID_REPETITION,
            opcodes: Opcodes::default(),
            test_sequence: TEST_SEQ_CODE.to_string(),
            settle_delay_ms: SETTLE_DELAY_MS,
            handshake_timeout_ms: HANDSHAKE_TIMEOUT_MS,
            close_delay_ms: CLOSE_DELAY_MS,
        }
    }
}

impl Config {
    /// Check the protocol invariants
    pub fn validate(&self) -> Result<()> {
        let Opcodes {
            switch_on,
            switch_off,
            send_sequence,
        } = self.opcodes;
        if switch_on == switch_off || switch_on == send_sequence || switch_off == send_sequence {
            return Err(EventCodeError::InvalidConfig(format!(
                "opcodes must be distinct (on={}, off={}, seq={})",
                switch_on, switch_off, send_sequence
            )));
        }
        if self.vendor_id_repetition < 1 {
            return Err(EventCodeError::InvalidConfig(
                "vendor_id_repetition must be at least 1".to_string(),
            ));
        }
        if self.baud_rate == 0 {
            return Err(EventCodeError::InvalidConfig(
                "baud_rate must be non-zero".to_string(),
            ));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            warn!(
                "Baud rate {} is not one the firmware is usually built for",
                self.baud_rate
            );
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

/// Lifecycle of the serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// A logical command for the firmware
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Hold `code` on the output lines for `duration_ms`
    SwitchOn { code: u16, duration_ms: u32 },
    /// Drop all output lines
    SwitchOff,
    /// Play `codes` one after another, each held for `duration_ms`
    Sequence { codes: Vec<u16>, duration_ms: u32 },
}

/// Host-side record of the last frame written to the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMarker {
    pub timestamp: DateTime<Utc>,
    pub command: Command,
}
