//! Wire-format snapshots for trigger blocks and full output reports.

use insta::assert_snapshot;
use padhaptics_hid_dualsense_protocol as ds;

// ── Trigger blocks ───────────────────────────────────────────────────────────

#[test]
fn snapshot_trigger_off() {
    let b = ds::trigger_off();
    assert_snapshot!(format!("{b:02X?}"), @"[05, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00]");
}

#[test]
fn snapshot_trigger_full_brake_resistance() {
    let b = ds::trigger_feedback(2, 8);
    assert_snapshot!(format!("{b:02X?}"), @"[21, FC, 03, C0, FF, FF, 3F, 00, 00, 00, 00]");
}

#[test]
fn snapshot_trigger_light_throttle_resistance() {
    let b = ds::trigger_feedback(1, 2);
    assert_snapshot!(format!("{b:02X?}"), @"[21, FE, 03, 48, 92, 24, 09, 00, 00, 00, 00]");
}

#[test]
fn snapshot_trigger_impact_vibration() {
    let b = ds::trigger_vibration(1, 4, 50);
    assert_snapshot!(format!("{b:02X?}"), @"[26, FE, 03, D8, B6, 6D, 1B, 00, 00, 32, 00]");
}

// ── Reports ──────────────────────────────────────────────────────────────────

#[test]
fn snapshot_usb_report() {
    let state = ds::DualSenseOutputState {
        rumble_right: 0xC0,
        rumble_left: 0x40,
        right_trigger: ds::trigger_vibration(1, 4, 50),
        left_trigger: ds::trigger_feedback(2, 8),
    };
    let mut out = [0u8; ds::USB_REPORT_LEN];
    state.encode_usb(&mut out);
    assert_snapshot!(
        format!("{out:02X?}"),
        @"[02, 0F, 00, C0, 40, 00, 00, 00, 00, 00, 00, 26, FE, 03, D8, B6, 6D, 1B, 00, 00, 32, 00, 21, FC, 03, C0, FF, FF, 3F, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00]"
    );
}

#[test]
fn snapshot_bluetooth_safe_state_crc() {
    let mut out = [0u8; ds::BT_REPORT_LEN];
    ds::DualSenseOutputState::safe().encode_bluetooth(0, &mut out);
    let crc = &out[74..];
    assert_snapshot!(format!("{crc:02X?}"), @"[9F, F0, BF, 87]");
}
