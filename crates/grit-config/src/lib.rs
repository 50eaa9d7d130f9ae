//! Preset management for grit waveshaping processors.
//!
//! A preset is a TOML description of an [`NlProcessor`](grit_core::NlProcessor):
//! the channel count, a sample-rate hint, the shaper sets in order, and which
//! one starts active.
//!
//! # Features
//!
//! - **Preset System**: Load and save presets from TOML files
//! - **Validation**: Unknown names, table sizes, fold amounts, duplicates
//! - **Paths**: Platform-specific user preset directory
//! - **Factory Presets**: Built-in presets, including the standard
//!   hard clip / tanh arrangement
//!
//! # Example
//!
//! ```rust
//! use grit_config::{Preset, SetConfig};
//! use grit_core::{CurveKind, Order};
//!
//! let preset = Preset::new("Warm")
//!     .with_description("Soft clip into a gentle fold")
//!     .with_channels(1)
//!     .with_set(SetConfig::new("soft", CurveKind::SoftClip).with_order(Order::First))
//!     .with_set(SetConfig::new("fold", CurveKind::Wavefolder).with_fold_amount(0.5));
//!
//! let mut processor = preset.build_processor().unwrap();
//! processor.prepare(f64::from(preset.sample_rate), 256);
//! ```

mod error;
mod preset;
mod set_config;

/// Platform-specific paths for presets.
pub mod paths;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{find_preset, list_user_presets, preset_name_from_path, user_presets_dir};
pub use preset::Preset;
pub use set_config::SetConfig;
pub use validation::{ValidationError, ValidationResult, validate_preset};
