//! Preset validation.
//!
//! A preset that parses as TOML can still describe a processor that cannot
//! be built: an unknown curve, a table too large to allocate, two sets with
//! the same name. [`validate_preset`] catches those before any table is
//! built.
//!
//! # Example
//!
//! ```rust
//! use grit_config::{Preset, SetConfig, ValidationError, validate_preset};
//! use grit_core::CurveKind;
//!
//! let preset = Preset::new("dup")
//!     .with_set(SetConfig::new("a", CurveKind::Tanh))
//!     .with_set(SetConfig::new("a", CurveKind::HardClip));
//! assert_eq!(
//!     validate_preset(&preset),
//!     Err(ValidationError::DuplicateSetName("a".to_string()))
//! );
//! ```

use std::collections::HashSet;

use grit_core::{MAX_FOLD_AMOUNT, MAX_TABLE_SIZE, MIN_TABLE_SIZE};
use thiserror::Error;

use crate::Preset;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Curve name not recognised.
    #[error("set '{set}': unknown curve '{curve}'")]
    UnknownCurve {
        /// Set name.
        set: String,
        /// Rejected curve name.
        curve: String,
    },

    /// Order name not recognised.
    #[error("set '{set}': unknown order '{order}' (expected direct, first or second)")]
    UnknownOrder {
        /// Set name.
        set: String,
        /// Rejected order name.
        order: String,
    },

    /// Evaluation name not recognised.
    #[error("set '{set}': unknown evaluation '{evaluation}' (expected analytic or tables)")]
    UnknownEvaluation {
        /// Set name.
        set: String,
        /// Rejected evaluation name.
        evaluation: String,
    },

    /// Table size outside the supported range.
    #[error("set '{set}': table size {size} out of range [{min}, {max}]")]
    TableSizeOutOfRange {
        /// Set name.
        set: String,
        /// Rejected size.
        size: usize,
        /// Minimum allowed size.
        min: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Fold amount outside the supported range.
    #[error("set '{set}': fold amount {value} out of range [0, {max}]")]
    FoldOutOfRange {
        /// Set name.
        set: String,
        /// Rejected value.
        value: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Two sets share a name.
    #[error("duplicate set name '{0}'")]
    DuplicateSetName(String),

    /// Channel count is zero.
    #[error("preset must have at least one channel")]
    NoChannels,

    /// `active` names a set the preset does not define.
    #[error("active set '{0}' is not defined")]
    UnknownActiveSet(String),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub(crate) fn validate_table_size(set: &str, size: usize) -> ValidationResult<()> {
    if (MIN_TABLE_SIZE..=MAX_TABLE_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(ValidationError::TableSizeOutOfRange {
            set: set.to_string(),
            size,
            min: MIN_TABLE_SIZE,
            max: MAX_TABLE_SIZE,
        })
    }
}

pub(crate) fn validate_fold_amount(set: &str, value: f64) -> ValidationResult<()> {
    // Written so that NaN fails too.
    if (0.0..=MAX_FOLD_AMOUNT).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::FoldOutOfRange {
            set: set.to_string(),
            value,
            max: MAX_FOLD_AMOUNT,
        })
    }
}

/// Check a whole preset. Returns the first problem found.
pub fn validate_preset(preset: &Preset) -> ValidationResult<()> {
    if preset.channels == 0 {
        return Err(ValidationError::NoChannels);
    }

    let mut names = HashSet::new();
    for set in &preset.sets {
        if !names.insert(set.name.as_str()) {
            return Err(ValidationError::DuplicateSetName(set.name.clone()));
        }
        set.to_spec()?;
    }

    if let Some(active) = &preset.active
        && !names.contains(active.as_str())
    {
        return Err(ValidationError::UnknownActiveSet(active.clone()));
    }

    Ok(())
}
