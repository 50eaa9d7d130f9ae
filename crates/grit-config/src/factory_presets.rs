//! Factory presets bundled with grit.
//!
//! These presets are always available without external files and serve as
//! starting points for custom ones.

use crate::Preset;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &["standard", "all_curves", "folder"];

/// TOML content for factory presets.
///
/// These are embedded at compile time and always available.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("standard", STANDARD_PRESET),
    ("all_curves", ALL_CURVES_PRESET),
    ("folder", FOLDER_PRESET),
];

/// Hard clip and tanh, second order, table-backed.
const STANDARD_PRESET: &str = r#"
name = "Standard"
description = "Hard clip and tanh, second-order ADAA from lookup tables"
channels = 2
sample_rate = 48000

[[sets]]
name = "hard clip"
curve = "hard_clip"
order = "second"
evaluation = "tables"
table_size = 65536

[[sets]]
name = "tanh"
curve = "tanh"
order = "second"
evaluation = "tables"
table_size = 65536
"#;

/// Every curve, analytic second order.
const ALL_CURVES_PRESET: &str = r#"
name = "All Curves"
description = "Every built-in curve with analytic second-order ADAA"
channels = 2
sample_rate = 48000
active = "tanh"

[[sets]]
name = "hard clip"
curve = "hard_clip"

[[sets]]
name = "soft clip"
curve = "soft_clip"

[[sets]]
name = "tanh"
curve = "tanh"

[[sets]]
name = "half wave"
curve = "half_wave"

[[sets]]
name = "full wave"
curve = "full_wave"

[[sets]]
name = "wavefolder"
curve = "wavefolder"
fold_amount = 1.0
"#;

/// Wavefolder with a fixed fold amount, first order from tables.
const FOLDER_PRESET: &str = r#"
name = "Folder"
description = "Sine wavefolder, first-order ADAA from lookup tables"
channels = 2
sample_rate = 48000

[[sets]]
name = "fold"
curve = "wavefolder"
order = "first"
evaluation = "tables"
table_size = 16384
fold_amount = 2.0
"#;

/// Get all factory presets.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by name.
///
/// Matches the internal identifier or the preset's `name` field,
/// case-insensitively.
///
/// # Example
///
/// ```rust
/// use grit_config::get_factory_preset;
///
/// let preset = get_factory_preset("standard").unwrap();
/// assert_eq!(preset.len(), 2);
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    for (preset_name, toml) in FACTORY_PRESETS_TOML {
        if preset_name.to_lowercase() == name_lower {
            return Preset::from_toml(toml).ok();
        }
    }

    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Get the names of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a preset name is a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}
