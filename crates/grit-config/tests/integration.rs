//! Integration tests for grit-config.
//!
//! These tests verify end-to-end functionality across modules: presets
//! written to disk, loaded back, and built into working processors.

use grit_config::{
    ConfigError, Preset, SetConfig, ValidationError, factory_presets, get_factory_preset,
};
use grit_core::{CurveKind, Order};
use tempfile::TempDir;

#[test]
fn test_save_load_build_process() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("drive.toml");

    let preset = Preset::new("Drive")
        .with_channels(2)
        .with_set(SetConfig::new("clip", CurveKind::HardClip).with_tables(2048))
        .with_set(SetConfig::new("soft", CurveKind::SoftClip).with_order(Order::First))
        .with_active("clip");
    preset.save(&path).expect("save should create parent dirs");

    let loaded = Preset::load(&path).unwrap();
    assert_eq!(loaded, preset);

    let mut processor = loaded.build_processor().unwrap();
    processor.prepare(f64::from(loaded.sample_rate), 256);

    let mut left: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin() * 2.0).collect();
    let mut right = left.clone();
    processor.process_block(&mut [&mut left[..], &mut right[..]]);

    assert!(left.iter().all(|s| s.is_finite() && s.abs() <= 1.0 + 1e-3));
    assert_eq!(left, right);
}

#[test]
fn test_load_missing_file() {
    let err = Preset::load("/no/such/preset.toml").unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_unknown_curve_in_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
name = "Bad"

[[sets]]
name = "mystery"
curve = "cubic"
"#,
    )
    .unwrap();

    let preset = Preset::load(&path).unwrap();
    match preset.build_processor() {
        Err(ConfigError::Validation(ValidationError::UnknownCurve { set, curve })) => {
            assert_eq!(set, "mystery");
            assert_eq!(curve, "cubic");
        }
        other => panic!("expected unknown curve, got {other:?}"),
    }
}

#[test]
fn test_duplicate_set_names() {
    let preset = Preset::new("Dup")
        .with_set(SetConfig::new("x", CurveKind::Tanh))
        .with_set(SetConfig::new("x", CurveKind::FullWave));
    assert!(matches!(
        preset.build_processor(),
        Err(ConfigError::Validation(ValidationError::DuplicateSetName(_)))
    ));
}

#[test]
fn test_factory_presets_build() {
    // The standard preset builds 1<<16-point tables; the others are cheap.
    for preset in factory_presets() {
        let processor = preset.build_processor().unwrap();
        assert_eq!(processor.sets().len(), preset.len());
        assert!(!processor.needs_initialise());
    }
}

#[test]
fn test_all_curves_preset_selects_tanh() {
    let preset = get_factory_preset("all_curves").unwrap();
    let processor = preset.build_processor().unwrap();
    assert_eq!(
        processor.active_set().map(|s| s.name().to_string()),
        Some("tanh".to_string())
    );
}
