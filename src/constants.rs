//! Protocol constants for the event-code bridge.
//!
//! This module defines the defaults used by the Arduino event-code firmware,
//! including command opcodes, timing parameters, and serial port configuration.
//! All of them can be overridden through [`Config`](crate::Config).

/// Default serial port when auto-discovery is disabled
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Glob pattern used to enumerate candidate devices
pub const DEFAULT_PORT_PATTERN: &str = "/dev/ttyACM[0-9]*";

/// Baud rate (115200 bps)
pub const BAUD_RATE: u32 = 115_200;

/// Baud rates the firmware has been built for
pub const SUPPORTED_BAUD_RATES: [u32; 17] = [
    9_600, 19_200, 38_400, 57_600, 115_200, 230_400, 500_000, 576_000, 921_600, 1_000_000,
    1_152_000, 1_500_000, 2_000_000, 2_500_000, 3_000_000, 3_500_000, 4_000_000,
];

/// Switch-on command (raise event code for a duration)
pub const SWITCH_ON_CMD: u8 = 111;

/// Switch-off command (drop all lines)
pub const SWITCH_OFF_CMD: u8 = 112;

/// Send-sequence command
pub const SEND_SEQ_CMD: u8 = 211;

/// Vendor identification code echoed back by the firmware
pub const VENDOR_ID_CODE: u8 = 123;

/// Number of vendor id bytes in an identification probe
pub const VENDOR_ID_REPETITION: usize = 7;

/// Code sent by `send_start_code` when none is given
pub const START_CODE: u16 = 128;

/// Default hold time of a single event code in milliseconds
pub const DURATION_MS: u32 = 200;

/// Default hold time of each code in a sequence in milliseconds
pub const DURATION_SEQ_MS: u32 = 10;

/// Test sequence: duration followed by the codes
pub const TEST_SEQ_CODE: &str = "1000,255,128,64,32,16,8,4,2,1,2048,1024,512,256";

/// Size of a switch-on/switch-off frame and of the sequence header
pub const FRAME_SIZE: usize = 7;

/// Maximum number of codes in one sequence frame (count byte holds 2 * N)
pub const MAX_SEQUENCE_CODES: usize = 127;

/// Settling time after opening the port while the bootloader finishes
pub const SETTLE_DELAY_MS: u64 = 2000;

/// Read timeout while waiting for the vendor id reply
pub const HANDSHAKE_TIMEOUT_MS: u64 = 1000;

/// Delay after the final switch-off before the port is released
pub const CLOSE_DELAY_MS: u64 = 1000;

/// Longest vendor id reply accepted before giving up on a line
pub const MAX_LINE_LENGTH: usize = 64;
