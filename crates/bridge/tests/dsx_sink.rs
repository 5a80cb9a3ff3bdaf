//! DSX file sink against a real directory.

use std::fs;

use padhaptics_bridge::{DsxFileSink, OutputError, OutputSink};
use padhaptics_effects::{RumbleEffect, TriggerEffect};
use padhaptics_test_helpers::TestResult;

#[test]
fn not_connected_until_directory_exists() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("DualSenseX").join("triggers.txt");
    let mut sink = DsxFileSink::new(&target);

    assert!(!sink.try_connect());
    assert!(matches!(
        sink.send_safe_state(),
        Err(OutputError::NotConnected)
    ));

    fs::create_dir(dir.path().join("DualSenseX"))?;
    assert!(sink.try_connect());
    Ok(())
}

#[test]
fn writes_commands_and_drops_rumble() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("triggers.txt");
    let mut sink = DsxFileSink::new(&target);
    assert!(sink.try_connect());

    sink.send(
        TriggerEffect::feedback(2, 8),
        TriggerEffect::vibration(1, 5, 50),
        RumbleEffect::new(1.0, 1.0),
    )?;

    assert_eq!(
        fs::read_to_string(&target)?,
        "left=Resistance 2 8\nright=Resistance 1 5\n"
    );
    assert!(!dir.path().join("triggers.tmp").exists());
    Ok(())
}

#[test]
fn unchanged_content_is_not_rewritten() -> TestResult {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("triggers.txt");
    let mut sink = DsxFileSink::new(&target);
    assert!(sink.try_connect());

    let left = TriggerEffect::feedback(2, 4);
    sink.send(left, TriggerEffect::Off, RumbleEffect::NONE)?;
    fs::write(&target, "touched")?;

    // Rumble changes alone do not change the file.
    sink.send(left, TriggerEffect::Off, RumbleEffect::new(0.5, 0.5))?;
    assert_eq!(fs::read_to_string(&target)?, "touched");

    sink.send_safe_state()?;
    assert_eq!(fs::read_to_string(&target)?, "left=Normal\nright=Normal\n");
    Ok(())
}

#[test]
fn write_failure_disconnects() -> TestResult {
    let dir = tempfile::tempdir()?;
    let sub = dir.path().join("dsx");
    fs::create_dir(&sub)?;
    let mut sink = DsxFileSink::new(sub.join("triggers.txt"));
    assert!(sink.try_connect());

    fs::remove_dir(&sub)?;
    let result = sink.send(TriggerEffect::feedback(1, 2), TriggerEffect::Off, RumbleEffect::NONE);

    assert!(matches!(result, Err(OutputError::Io { .. })));
    assert!(!sink.is_connected());
    assert!(!sink.try_connect());
    Ok(())
}
