//! Loading bridge configuration from disk.

use std::fs;

use padhaptics_bridge::{BridgeConfig, OutputMode};
use padhaptics_test_helpers::TestResult;

#[test]
fn missing_file_falls_back_to_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = BridgeConfig::load(&dir.path().join("absent.json"))?;
    assert_eq!(cfg, BridgeConfig::default());
    Ok(())
}

#[test]
fn json_file_overrides_selected_knobs() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("padhaptics.json");
    fs::write(
        &path,
        r#"{
            "output_mode": "dsx",
            "dsx_file_path": "/tmp/dsx/triggers.txt",
            "max_throttle_strength": 3,
            "gains": { "kerb": 0.5 },
            "max_steer_angle_deg": 25.0
        }"#,
    )?;

    let cfg = BridgeConfig::load(&path)?;
    cfg.validate()?;

    assert_eq!(cfg.output_mode, OutputMode::Dsx);
    assert_eq!(cfg.effects.max_throttle_strength, 3);
    assert!((cfg.effects.gains.kerb - 0.5).abs() < f64::EPSILON);
    assert!((cfg.effects.gains.road - 0.5).abs() < f64::EPSILON);
    assert!((cfg.geometry.max_steer_angle_deg - 25.0).abs() < f64::EPSILON);
    assert_eq!(cfg.update_hz, 120);
    Ok(())
}

#[test]
fn yaml_file_is_detected_by_extension() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("padhaptics.yaml");
    fs::write(&path, "update_hz: 60\nreconnect_interval_ms: 500\nabs_grip_threshold: 0.8\n")?;

    let cfg = BridgeConfig::load(&path)?;

    assert_eq!(cfg.update_hz, 60);
    assert_eq!(cfg.reconnect_ticks(), 31);
    assert!((cfg.effects.abs_grip_threshold - 0.8).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn malformed_file_names_the_path() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"update_hz\": ")?;

    let err = BridgeConfig::load(&path).err().ok_or("expected a parse error")?;
    assert!(format!("{err:#}").contains("broken.json"));
    Ok(())
}

#[test]
fn out_of_range_values_load_but_fail_validation() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("padhaptics.json");
    fs::write(&path, r#"{ "max_brake_strength": 12 }"#)?;

    let cfg = BridgeConfig::load(&path)?;
    let err = cfg.validate().err().ok_or("expected a validation error")?;
    assert!(format!("{err:#}").contains("max_brake_strength"));
    Ok(())
}

#[test]
fn effective_config_round_trips_through_json() -> TestResult {
    let cfg = BridgeConfig {
        update_hz: 90,
        ..BridgeConfig::default()
    };
    let json = serde_json::to_string_pretty(&cfg)?;
    assert_eq!(BridgeConfig::parse(&json, false)?, cfg);
    Ok(())
}
