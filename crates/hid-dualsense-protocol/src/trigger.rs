//! Adaptive-trigger effect blocks.
//!
//! Each trigger takes an 11-byte block inside the output report. The trigger
//! travel is split into ten zones (0 = rest, 9 = fully pressed); an effect
//! is active in zones `start..10`.
//!
//! ```text
//! Off:       [0x05, 0 ...]
//! Feedback:  [0x21, mask lo, mask hi, force zones (u32 LE), 0, 0, 0, 0]
//! Vibration: [0x26, mask lo, mask hi, amplitude zones (u32 LE), 0, 0, freq, 0]
//! ```
//!
//! Zone values are 3 bits wide (`level - 1`) at bit `3 * zone`.

use crate::ids::trigger_modes;

/// Wire size of one trigger effect block.
pub const TRIGGER_BLOCK_LEN: usize = 11;

/// Number of zones along the trigger travel.
pub const TRIGGER_ZONES: u8 = 10;

/// Highest accepted start zone.
pub const MAX_START_ZONE: u8 = 9;

/// Highest strength or amplitude level.
pub const MAX_LEVEL: u8 = 8;

pub type TriggerBlock = [u8; TRIGGER_BLOCK_LEN];

/// Releases the trigger motor.
pub const fn trigger_off() -> TriggerBlock {
    let mut block = [0u8; TRIGGER_BLOCK_LEN];
    block[0] = trigger_modes::OFF;
    block
}

/// Continuous resistance from `start` to the end of travel.
///
/// `start` is clamped to `0..=9`, `strength` to `1..=8`.
pub fn trigger_feedback(start: u8, strength: u8) -> TriggerBlock {
    zoned_block(trigger_modes::FEEDBACK, start, strength, 0)
}

/// Vibration from `start` to the end of travel at `frequency_hz`.
///
/// `start` is clamped to `0..=9`, `amplitude` to `1..=8`.
pub fn trigger_vibration(start: u8, amplitude: u8, frequency_hz: u8) -> TriggerBlock {
    zoned_block(trigger_modes::VIBRATION, start, amplitude, frequency_hz)
}

fn zoned_block(mode: u8, start: u8, level: u8, frequency_hz: u8) -> TriggerBlock {
    let (mask, zones) = pack_zones(start, level);
    let [mask_lo, mask_hi] = mask.to_le_bytes();
    let [z0, z1, z2, z3] = zones.to_le_bytes();
    [
        mode,
        mask_lo,
        mask_hi,
        z0,
        z1,
        z2,
        z3,
        0,
        0,
        frequency_hz,
        0,
    ]
}

/// Active-zone mask and packed 3-bit zone values.
fn pack_zones(start: u8, level: u8) -> (u16, u32) {
    let start = start.min(MAX_START_ZONE);
    let value = u32::from(level.clamp(1, MAX_LEVEL) - 1) & 0x07;
    (start..TRIGGER_ZONES).fold((0u16, 0u32), |(mask, zones), zone| {
        (mask | (1 << zone), zones | (value << (3 * u32::from(zone))))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_block_is_mode_byte_only() {
        let block = trigger_off();
        assert_eq!(block[0], 0x05);
        assert!(block[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn feedback_masks_zones_from_start() {
        let block = trigger_feedback(2, 8);
        assert_eq!(block[0], 0x21);
        assert_eq!(u16::from_le_bytes([block[1], block[2]]), 0b11_1111_1100);
        assert_eq!(
            u32::from_le_bytes([block[3], block[4], block[5], block[6]]),
            0x3FFF_FFC0
        );
        assert_eq!(block[9], 0);
    }

    #[test]
    fn vibration_carries_frequency() {
        let block = trigger_vibration(1, 4, 50);
        assert_eq!(block[0], 0x26);
        assert_eq!(u16::from_le_bytes([block[1], block[2]]), 0x03FE);
        assert_eq!(block[9], 50);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(trigger_feedback(200, 0), trigger_feedback(9, 1));
        assert_eq!(trigger_vibration(12, 99, 30), trigger_vibration(9, 8, 30));
    }

    #[test]
    fn lowest_strength_encodes_zero_force() {
        let block = trigger_feedback(0, 1);
        assert_eq!(u16::from_le_bytes([block[1], block[2]]), 0x03FF);
        assert!(block[3..7].iter().all(|b| *b == 0));
    }
}
