//! Frame encoding for the event-code firmware.
//!
//! Every frame starts with an opcode. Switch frames are always
//! [`FRAME_SIZE`] bytes; sequence frames carry a 7 byte header followed by
//! one low/high byte pair per code. Multi-byte fields are little-endian.

use crate::constants::{FRAME_SIZE, MAX_SEQUENCE_CODES};
use crate::error::{EventCodeError, Result};
use crate::types::{Command, Opcodes};

/// Encode a switch-on or switch-off frame.
///
/// A switch-off frame always has a zero payload, whatever `code` and
/// `duration_ms` hold.
pub fn encode_switch(opcodes: &Opcodes, on: bool, code: u16, duration_ms: u32) -> [u8; FRAME_SIZE] {
    if !on {
        return switch_off_frame(opcodes.switch_off);
    }

    let mut frame = [0u8; FRAME_SIZE];
    frame[0] = opcodes.switch_on;
    frame[1..3].copy_from_slice(&code.to_le_bytes());
    frame[3..7].copy_from_slice(&duration_ms.to_le_bytes());
    frame
}

/// The fixed switch-off frame
pub fn switch_off_frame(opcode: u8) -> [u8; FRAME_SIZE] {
    let mut frame = [0u8; FRAME_SIZE];
    frame[0] = opcode;
    frame
}

/// Encode a sequence frame: opcode, count (2 * N), reserved, duration, codes.
pub fn encode_sequence(opcode: u8, codes: &[u16], duration_ms: u32) -> Result<Vec<u8>> {
    if codes.len() > MAX_SEQUENCE_CODES {
        return Err(EventCodeError::SequenceTooLong { count: codes.len() });
    }

    let mut frame = Vec::with_capacity(FRAME_SIZE + 2 * codes.len());
    frame.push(opcode);
    frame.push((codes.len() * 2) as u8);
    frame.push(0);
    frame.extend_from_slice(&duration_ms.to_le_bytes());
    for code in codes {
        frame.extend_from_slice(&code.to_le_bytes());
    }
    Ok(frame)
}

/// Vendor identification probe: `vendor_id` repeated `repetitions` times
pub fn encode_vendor_probe(vendor_id: u8, repetitions: usize) -> Vec<u8> {
    vec![vendor_id; repetitions]
}

/// Encode any [`Command`] with the given opcodes
pub fn encode_command(opcodes: &Opcodes, command: &Command) -> Result<Vec<u8>> {
    match command {
        Command::SwitchOn { code, duration_ms } => {
            Ok(encode_switch(opcodes, true, *code, *duration_ms).to_vec())
        }
        Command::SwitchOff => Ok(switch_off_frame(opcodes.switch_off).to_vec()),
        Command::Sequence { codes, duration_ms } => {
            encode_sequence(opcodes.send_sequence, codes, *duration_ms)
        }
    }
}

/// Space separated hex dump used by the TX/RX debug log
pub(crate) fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_switch(frame: &[u8; FRAME_SIZE]) -> (u8, u16, u32) {
        let code = u16::from_le_bytes([frame[1], frame[2]]);
        let duration = u32::from_le_bytes([frame[3], frame[4], frame[5], frame[6]]);
        (frame[0], code, duration)
    }

    #[test]
    fn switch_on_round_trip() {
        let opcodes = Opcodes::default();
        for &(code, duration) in &[(0u16, 0u32), (255, 10_000), (0xABCD, 200), (u16::MAX, u32::MAX)] {
            let frame = encode_switch(&opcodes, true, code, duration);
            assert_eq!(decode_switch(&frame), (opcodes.switch_on, code, duration));
        }
    }

    #[test]
    fn switch_on_matches_firmware_layout() {
        let frame = encode_switch(&Opcodes::default(), true, 255, 10_000);
        assert_eq!(frame, [111, 255, 0, 16, 39, 0, 0]);

        let frame = encode_switch(&Opcodes::default(), true, 2048 + 255, 200);
        assert_eq!(frame, [111, 255, 8, 200, 0, 0, 0]);
    }

    #[test]
    fn duration_bytes_are_little_endian() {
        let opcodes = Opcodes::default();
        for duration in [0u32, 1, 255, 256, 65_535, 65_536, 0x0102_0304, u32::MAX - 1, u32::MAX] {
            let frame = encode_switch(&opcodes, true, 1, duration);
            let read_back = u32::from_le_bytes([frame[3], frame[4], frame[5], frame[6]]);
            assert_eq!(read_back, duration);
        }
    }

    #[test]
    fn switch_off_ignores_payload() {
        let opcodes = Opcodes::default();
        let frame = encode_switch(&opcodes, false, 0xFFFF, 12_345);
        assert_eq!(frame, [112, 0, 0, 0, 0, 0, 0]);
        assert_eq!(frame, switch_off_frame(opcodes.switch_off));
    }

    #[test]
    fn sequence_length_and_count_byte() {
        for len in [1usize, 2, 13, 64, 127] {
            let codes: Vec<u16> = (0..len as u16).collect();
            let frame = encode_sequence(211, &codes, 10).unwrap();
            assert_eq!(frame.len(), 7 + 2 * len);
            assert_eq!(frame[1] as usize, 2 * len);
            assert_eq!(frame[2], 0);
        }
    }

    #[test]
    fn sequence_interleaves_low_high_bytes() {
        let frame = encode_sequence(211, &[255, 128, 0x0800, 0x1234], 1000).unwrap();
        assert_eq!(
            frame,
            vec![211, 8, 0, 0xE8, 0x03, 0, 0, 255, 0, 128, 0, 0x00, 0x08, 0x34, 0x12]
        );
    }

    #[test]
    fn sequence_of_128_codes_is_too_long() {
        let codes = vec![1u16; 128];
        match encode_sequence(211, &codes, 10) {
            Err(EventCodeError::SequenceTooLong { count }) => assert_eq!(count, 128),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn vendor_probe_repeats_id() {
        assert_eq!(encode_vendor_probe(123, 7), vec![123; 7]);
        assert_eq!(encode_vendor_probe(42, 1), vec![42]);
    }

    #[test]
    fn command_encoding_uses_configured_opcodes() {
        let opcodes = Opcodes {
            switch_on: 1,
            switch_off: 2,
            send_sequence: 3,
        };
        let on = encode_command(&opcodes, &Command::SwitchOn { code: 5, duration_ms: 6 }).unwrap();
        assert_eq!(on, vec![1, 5, 0, 6, 0, 0, 0]);
        let off = encode_command(&opcodes, &Command::SwitchOff).unwrap();
        assert_eq!(off, vec![2, 0, 0, 0, 0, 0, 0]);
        let seq = encode_command(
            &opcodes,
            &Command::Sequence {
                codes: vec![7],
                duration_ms: 8,
            },
        )
        .unwrap();
        assert_eq!(seq, vec![3, 2, 0, 8, 0, 0, 0, 7, 0]);
    }

    #[test]
    fn hex_dump_formats_bytes() {
        assert_eq!(hex_dump(&[0x6F, 0xFF, 0x00]), "6F FF 00");
    }
}
