//! Preset file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use grit_core::{NlProcessor, ShaperSet};

use crate::error::ConfigError;
use crate::set_config::SetConfig;
use crate::validation::{ValidationError, validate_preset};

/// Preset file format for a waveshaping processor.
///
/// A preset lists the shaper sets a processor holds and names the one that
/// starts active. Presets can be loaded from files, created
/// programmatically, and saved to disk.
///
/// # TOML Format
///
/// ```toml
/// name = "Drive"
/// description = "Clip and saturate, table-backed"
/// channels = 2
/// sample_rate = 48000
/// active = "tanh"
///
/// [[sets]]
/// name = "clip"
/// curve = "hard_clip"
/// evaluation = "tables"
///
/// [[sets]]
/// name = "tanh"
/// curve = "tanh"
/// order = "first"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Number of audio channels (defaults to 2).
    #[serde(default = "default_channels")]
    pub channels: usize,

    /// Sample rate hint (defaults to 48000).
    /// Passed to `prepare`; the recurrences themselves ignore it.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Name of the set active after loading; the first set when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,

    /// Shaper sets in processor order.
    #[serde(default)]
    pub sets: Vec<SetConfig>,
}

fn default_channels() -> usize {
    2
}

fn default_sample_rate() -> u32 {
    48000
}

impl Preset {
    /// Create a new empty stereo preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            channels: default_channels(),
            sample_rate: default_sample_rate(),
            active: None,
            sets: Vec::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the channel count.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Add a set to the preset.
    pub fn with_set(mut self, set: SetConfig) -> Self {
        self.sets.push(set);
        self
    }

    /// Name the set that starts active.
    pub fn with_active(mut self, name: impl Into<String>) -> Self {
        self.active = Some(name.into());
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset: Preset = toml::from_str(&content)?;
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the preset without building anything.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_preset(self)
    }

    /// Look up a set by name.
    pub fn get(&self, name: &str) -> Option<&SetConfig> {
        self.sets.iter().find(|set| set.name == name)
    }

    /// Get the number of sets in the preset.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if the preset has no sets.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Build the processor this preset describes.
    ///
    /// Validates first, then builds every set (including lookup tables) and
    /// selects the active one. The result still needs `prepare` with the
    /// host's block size.
    pub fn build_processor(&self) -> Result<NlProcessor, ConfigError> {
        self.validate()?;

        let mut processor = NlProcessor::new(self.channels);
        for set in &self.sets {
            processor.add_set(ShaperSet::new(set.to_spec()?, self.channels));
        }
        processor.initialise();

        if let Some(active) = &self.active {
            processor
                .select_by_name(active)
                .map_err(|_| ValidationError::UnknownActiveSet(active.clone()))?;
        }

        Ok(processor)
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grit_core::{CurveKind, Evaluation, Order};

    #[test]
    fn test_preset_new() {
        let preset = Preset::new("Test Preset");
        assert_eq!(preset.name, "Test Preset");
        assert!(preset.description.is_none());
        assert_eq!(preset.channels, 2);
        assert_eq!(preset.sample_rate, 48000);
        assert!(preset.is_empty());
    }

    #[test]
    fn test_preset_from_toml() {
        let preset = Preset::from_toml(
            r#"
name = "Drive"
channels = 1
active = "soft"

[[sets]]
name = "clip"
curve = "hard_clip"
evaluation = "tables"
table_size = 1024

[[sets]]
name = "soft"
curve = "soft_clip"
order = "first"
"#,
        )
        .unwrap();

        assert_eq!(preset.channels, 1);
        assert_eq!(preset.sample_rate, 48000);
        assert_eq!(preset.len(), 2);
        assert_eq!(preset.get("clip").map(|s| s.table_size), Some(1024));
        assert_eq!(preset.get("soft").map(|s| s.order.as_str()), Some("first"));
        assert!(preset.get("missing").is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let preset = Preset::new("Round")
            .with_description("trip")
            .with_channels(1)
            .with_set(
                SetConfig::new("fold", CurveKind::Wavefolder)
                    .with_order(Order::First)
                    .with_fold_amount(2.0),
            )
            .with_active("fold");
        let parsed = Preset::from_toml(&preset.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, preset);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Preset::from_toml("name = "),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_build_processor() {
        let preset = Preset::new("Build")
            .with_channels(1)
            .with_set(SetConfig::new("clip", CurveKind::HardClip).with_tables(256))
            .with_set(SetConfig::new("tanh", CurveKind::Tanh).with_order(Order::Direct))
            .with_active("tanh");

        let mut processor = preset.build_processor().unwrap();
        assert_eq!(processor.channels(), 1);
        assert_eq!(processor.active_index(), 1);
        assert!(!processor.needs_initialise());
        assert_eq!(
            processor.sets()[0].spec().evaluation,
            Evaluation::Tables
        );

        processor.prepare(48000.0, 16);
        let mut mono = [3.0_f32; 16];
        processor.process_block(&mut [&mut mono[..]]);
        assert!(mono.iter().all(|s| (s - 3.0_f32.tanh()).abs() < 1e-6));
    }

    #[test]
    fn test_build_rejects_invalid() {
        let preset = Preset::new("Bad").with_set(
            SetConfig::new("clip", CurveKind::HardClip).with_tables(4),
        );
        assert!(matches!(
            preset.build_processor(),
            Err(ConfigError::Validation(
                ValidationError::TableSizeOutOfRange { .. }
            ))
        ));
    }
}
