//! DualSense USB/Bluetooth identifiers and wire constants.

#![deny(static_mut_refs)]

/// Sony Interactive Entertainment vendor ID.
pub const SONY_VENDOR_ID: u16 = 0x054C;

/// Product IDs of controllers that accept the DualSense output report.
pub mod product_ids {
    pub const DUALSENSE: u16 = 0x0CE6;
    pub const DUALSENSE_EDGE: u16 = 0x0DF2;
}

/// HID output report IDs.
pub mod report_ids {
    /// USB output report.
    pub const USB_OUTPUT: u8 = 0x02;
    /// Bluetooth output report carrying the full effect payload.
    pub const BT_OUTPUT: u8 = 0x31;
}

/// Adaptive-trigger mode bytes (first byte of an effect block).
pub mod trigger_modes {
    pub const OFF: u8 = 0x05;
    pub const FEEDBACK: u8 = 0x21;
    pub const VIBRATION: u8 = 0x26;
}

/// Bits of the first valid-flag byte of the common payload.
pub mod valid_flag0 {
    /// Rumble emulation through the voice-coil actuators.
    pub const COMPATIBLE_VIBRATION: u8 = 0x01;
    /// Use the rumble bytes instead of haptic audio.
    pub const HAPTICS_SELECT: u8 = 0x02;
    pub const RIGHT_TRIGGER_EFFECT: u8 = 0x04;
    pub const LEFT_TRIGGER_EFFECT: u8 = 0x08;
}

/// Byte prepended to Bluetooth output reports when computing the CRC-32.
pub const BT_CRC_SEED: u8 = 0xA2;

/// `true` for every product ID this crate can drive.
pub fn is_dualsense(product_id: u16) -> bool {
    matches!(
        product_id,
        product_ids::DUALSENSE | product_ids::DUALSENSE_EDGE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_both_models() {
        assert!(is_dualsense(0x0CE6));
        assert!(is_dualsense(0x0DF2));
        assert!(!is_dualsense(0x09CC));
    }
}
