//! Textual command lists.
//!
//! A command list is a comma separated list of integers whose first entry is
//! one of the configured opcodes:
//!
//! - switch-on: `opcode, code[, duration_ms]`
//! - sequence: `opcode, duration_ms, code1, code2, ...`
//! - switch-off: `opcode`
//!
//! For example `"211,1000,255,128"` plays 255 then 128, each for one second.

use crate::error::{EventCodeError, Result};
use crate::types::{Command, Config};

/// Event code carried by a wider integer: non-positive values become 0,
/// larger values keep their low 16 bits.
pub fn coerce_event_code(value: i64) -> u16 {
    if value <= 0 {
        0
    } else {
        (value & 0xFFFF) as u16
    }
}

/// Duration carried by a wider integer: negative values select `default`,
/// larger values keep their low 32 bits.
pub fn coerce_duration(value: i64, default: u32) -> u32 {
    if value < 0 {
        default
    } else {
        (value & 0xFFFF_FFFF) as u32
    }
}

/// Parse a command list into a [`Command`] using the opcodes and defaults of
/// `config`.
pub fn parse_command(text: &str, config: &Config) -> Result<Command> {
    let values = text
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<i64>()
                .map_err(|_| EventCodeError::BadCommand(format!("not an integer: {:?}", token)))
        })
        .collect::<Result<Vec<i64>>>()?;

    let (&opcode, args) = values
        .split_first()
        .ok_or_else(|| EventCodeError::BadCommand("empty command".to_string()))?;
    let opcodes = &config.opcodes;

    if opcode == i64::from(opcodes.switch_on) {
        let code = args
            .first()
            .ok_or_else(|| EventCodeError::BadCommand(format!("{}: missing event code", text)))?;
        let duration_ms = args
            .get(1)
            .map_or(config.duration_ms, |&d| coerce_duration(d, config.duration_ms));
        Ok(Command::SwitchOn {
            code: coerce_event_code(*code),
            duration_ms,
        })
    } else if opcode == i64::from(opcodes.send_sequence) {
        let (&duration, codes) = args
            .split_first()
            .ok_or_else(|| EventCodeError::BadCommand(format!("{}: missing duration", text)))?;
        Ok(Command::Sequence {
            codes: codes.iter().map(|&c| coerce_event_code(c)).collect(),
            duration_ms: coerce_duration(duration, config.duration_seq_ms),
        })
    } else if opcode == i64::from(opcodes.switch_off) {
        Ok(Command::SwitchOff)
    } else {
        Err(EventCodeError::BadCommand(format!("unknown opcode {}", opcode)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sequence() {
        let cmd = parse_command("211,1000,255,128", &Config::default()).unwrap();
        assert_eq!(
            cmd,
            Command::Sequence {
                codes: vec![255, 128],
                duration_ms: 1000
            }
        );
    }

    #[test]
    fn parses_switch_on_with_and_without_duration() {
        let config = Config::default();
        assert_eq!(
            parse_command("111,255,5000", &config).unwrap(),
            Command::SwitchOn {
                code: 255,
                duration_ms: 5000
            }
        );
        assert_eq!(
            parse_command("111, 16", &config).unwrap(),
            Command::SwitchOn {
                code: 16,
                duration_ms: config.duration_ms
            }
        );
        assert_eq!(
            parse_command("111,16,-1", &config).unwrap(),
            Command::SwitchOn {
                code: 16,
                duration_ms: config.duration_ms
            }
        );
    }

    #[test]
    fn parses_switch_off() {
        assert_eq!(
            parse_command("112", &Config::default()).unwrap(),
            Command::SwitchOff
        );
    }

    #[test]
    fn sequence_without_codes_is_empty() {
        assert_eq!(
            parse_command("211,500", &Config::default()).unwrap(),
            Command::Sequence {
                codes: vec![],
                duration_ms: 500
            }
        );
    }

    #[test]
    fn rejects_malformed_text() {
        let config = Config::default();
        for text in ["", "abc", "111,xx", "111,,5", "42,1,2", "111", "211", "1.5"] {
            assert!(
                matches!(parse_command(text, &config), Err(EventCodeError::BadCommand(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn follows_configured_opcodes() {
        let mut config = Config::default();
        config.opcodes.switch_on = 1;
        config.opcodes.switch_off = 2;
        config.opcodes.send_sequence = 3;

        assert_eq!(parse_command("2", &config).unwrap(), Command::SwitchOff);
        assert!(parse_command("111,255", &config).is_err());
    }

    #[test]
    fn coerces_wide_values() {
        assert_eq!(coerce_event_code(-5), 0);
        assert_eq!(coerce_event_code(0), 0);
        assert_eq!(coerce_event_code(0x1_00FF), 0x00FF);
        assert_eq!(coerce_duration(-1, 200), 200);
        assert_eq!(coerce_duration(0x1_0000_0010, 200), 0x10);
    }
}
