//! Sony DualSense HID output protocol: report encoders and adaptive-trigger
//! effect blocks.
//!
//! This crate is intentionally I/O-free and allocation-free. Opening the
//! device and writing the bytes is the caller's job.

#![deny(static_mut_refs)]

pub mod ids;
pub mod output;
pub mod trigger;

pub use ids::{SONY_VENDOR_ID, is_dualsense, product_ids, report_ids};
pub use output::{
    BT_REPORT_LEN, DualSenseOutputState, MAX_REPORT_LEN, Transport, USB_REPORT_LEN,
};
pub use trigger::{
    TRIGGER_BLOCK_LEN, TriggerBlock, trigger_feedback, trigger_off, trigger_vibration,
};
