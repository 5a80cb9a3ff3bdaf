//! DualSense output report encoding.
//!
//! All functions are pure and allocation-free.
//!
//! # Report layout
//!
//! USB and Bluetooth share a 47-byte common payload; only the framing
//! differs.
//!
//! ```text
//! USB  (0x02, 48 bytes): [id, common[47]]
//! BT   (0x31, 78 bytes): [id, seq << 4, 0x10, common[47], 0 ..., crc32 LE]
//!
//! common[0]      valid flags 0
//! common[1]      valid flags 1 (unused, 0)
//! common[2]      right (weak, high-frequency) motor
//! common[3]      left (strong, low-frequency) motor
//! common[10..21] right trigger effect block
//! common[21..32] left trigger effect block
//! ```
//!
//! The Bluetooth CRC-32 covers the seed byte `0xA2` followed by the first
//! 74 report bytes.

#![deny(static_mut_refs)]

use crate::ids::{BT_CRC_SEED, report_ids, valid_flag0};
use crate::trigger::{TRIGGER_BLOCK_LEN, TriggerBlock, trigger_off};

/// Wire size of the USB output report, including the report ID.
pub const USB_REPORT_LEN: usize = 48;

/// Wire size of the Bluetooth output report, including the report ID and CRC.
pub const BT_REPORT_LEN: usize = 78;

/// Largest report either transport produces.
pub const MAX_REPORT_LEN: usize = BT_REPORT_LEN;

/// Size of the payload shared by both transports.
pub const COMMON_LEN: usize = 47;

const USB_COMMON_OFFSET: usize = 1;
const BT_COMMON_OFFSET: usize = 3;
const BT_TAG: u8 = 0x10;
const BT_CRC_OFFSET: usize = BT_REPORT_LEN - 4;

const VALID_FLAG0: u8 = valid_flag0::COMPATIBLE_VIBRATION
    | valid_flag0::HAPTICS_SELECT
    | valid_flag0::RIGHT_TRIGGER_EFFECT
    | valid_flag0::LEFT_TRIGGER_EFFECT;

const FLAGS0: usize = 0;
const MOTOR_RIGHT: usize = 2;
const MOTOR_LEFT: usize = 3;
const RIGHT_TRIGGER: usize = 10;
const LEFT_TRIGGER: usize = RIGHT_TRIGGER + TRIGGER_BLOCK_LEN;

/// How the controller is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Usb,
    Bluetooth,
}

impl Transport {
    pub const fn report_len(self) -> usize {
        match self {
            Self::Usb => USB_REPORT_LEN,
            Self::Bluetooth => BT_REPORT_LEN,
        }
    }
}

/// Everything the bridge drives on the controller in one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualSenseOutputState {
    pub rumble_right: u8,
    pub rumble_left: u8,
    pub right_trigger: TriggerBlock,
    pub left_trigger: TriggerBlock,
}

impl Default for DualSenseOutputState {
    fn default() -> Self {
        Self::safe()
    }
}

impl DualSenseOutputState {
    /// Motors stopped and both triggers released.
    pub const fn safe() -> Self {
        Self {
            rumble_right: 0,
            rumble_left: 0,
            right_trigger: trigger_off(),
            left_trigger: trigger_off(),
        }
    }

    /// Encode the USB report into `out`. Returns the number of bytes to write.
    pub fn encode_usb(&self, out: &mut [u8; USB_REPORT_LEN]) -> usize {
        out.fill(0);
        out[0] = report_ids::USB_OUTPUT;
        if let Some(common) = out.get_mut(USB_COMMON_OFFSET..) {
            self.write_common(common);
        }
        USB_REPORT_LEN
    }

    /// Encode the Bluetooth report into `out`. Only the low 4 bits of `seq`
    /// are sent. Returns the number of bytes to write.
    pub fn encode_bluetooth(&self, seq: u8, out: &mut [u8; BT_REPORT_LEN]) -> usize {
        out.fill(0);
        out[0] = report_ids::BT_OUTPUT;
        out[1] = (seq & 0x0F) << 4;
        out[2] = BT_TAG;
        if let Some(common) = out.get_mut(BT_COMMON_OFFSET..BT_COMMON_OFFSET + COMMON_LEN) {
            self.write_common(common);
        }

        let (body, crc) = out.split_at_mut(BT_CRC_OFFSET);
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&[BT_CRC_SEED]);
        hasher.update(body);
        crc.copy_from_slice(&hasher.finalize().to_le_bytes());
        BT_REPORT_LEN
    }

    /// Encode for `transport` into a buffer sized for either report.
    pub fn encode(
        &self,
        transport: Transport,
        seq: u8,
        out: &mut [u8; MAX_REPORT_LEN],
    ) -> usize {
        match transport {
            Transport::Bluetooth => self.encode_bluetooth(seq, out),
            Transport::Usb => match out.first_chunk_mut::<USB_REPORT_LEN>() {
                Some(usb) => self.encode_usb(usb),
                None => 0,
            },
        }
    }

    fn write_common(&self, common: &mut [u8]) {
        put(common, FLAGS0, &[VALID_FLAG0]);
        put(common, MOTOR_RIGHT, &[self.rumble_right]);
        put(common, MOTOR_LEFT, &[self.rumble_left]);
        put(common, RIGHT_TRIGGER, &self.right_trigger);
        put(common, LEFT_TRIGGER, &self.left_trigger);
    }
}

fn put(buf: &mut [u8], at: usize, bytes: &[u8]) {
    if let Some(dst) = buf.get_mut(at..at + bytes.len()) {
        dst.copy_from_slice(bytes);
    }
}
