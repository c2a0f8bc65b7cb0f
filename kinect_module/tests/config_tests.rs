use kinect_module::{KinectConfig, KinectError, RetryPolicy, ShapeWriteMode};
use std::path::Path;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = KinectConfig::default();
    assert_eq!(config.channel_name, "KinectFaceTracking.FaceState");
    assert!(config.launch_companion);
    assert_eq!(config.retry_policy(), RetryPolicy::default());
    assert_eq!(config.poll_interval(), Duration::from_millis(10));
    assert_eq!(config.shape_write_mode, ShapeWriteMode::Reset);
}

#[test]
fn test_partial_json_fills_defaults() {
    let json = r#"{ "channel_name": "Custom", "poll_interval_ms": 20 }"#;
    let config = KinectConfig::from_json(Path::new("test.json"), json).unwrap();

    assert_eq!(config.channel_name, "Custom");
    assert_eq!(config.poll_interval(), Duration::from_millis(20));
    assert_eq!(config.connect_attempts, 5);
    assert_eq!(config.connect_retry_ms, 500);
}

#[test]
fn test_write_mode_aliases() {
    for (json, expected) in [
        (r#"{ "shape_write_mode": "CarryOver" }"#, ShapeWriteMode::CarryOver),
        (r#"{ "shape_write_mode": "carry_over" }"#, ShapeWriteMode::CarryOver),
        (r#"{ "write_mode": "reset" }"#, ShapeWriteMode::Reset),
    ] {
        let config = KinectConfig::from_json(Path::new("test.json"), json).unwrap();
        assert_eq!(config.shape_write_mode, expected, "{}", json);
    }
}

#[test]
fn test_zero_poll_interval_is_clamped() {
    let config = KinectConfig {
        poll_interval_ms: 0,
        ..Default::default()
    };
    assert_eq!(config.poll_interval(), Duration::from_millis(1));
}

#[test]
fn test_invalid_json_is_config_error() {
    let err = KinectConfig::from_json(Path::new("broken.json"), "{ nope").unwrap_err();
    assert!(matches!(err, KinectError::Config { .. }));
}

#[test]
fn test_load_writes_default_when_missing() {
    let dir = std::env::temp_dir().join(format!("kinect_config_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("kinect_module.json");
    let _ = std::fs::remove_file(&path);

    let config = KinectConfig::load(&path).unwrap();
    assert_eq!(config, KinectConfig::default());
    assert!(path.exists());

    // And reads it back unchanged
    assert_eq!(KinectConfig::load(&path).unwrap(), config);
    std::fs::remove_dir_all(&dir).unwrap();
}
