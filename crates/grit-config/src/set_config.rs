//! Configuration of a single shaper set.

use grit_core::{CurveKind, DEFAULT_TABLE_SIZE, Evaluation, Order, ShaperSpec};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// One `[[sets]]` entry of a preset.
///
/// Curve, order and evaluation are kept as strings so that a typo surfaces
/// as a [`ValidationError`] naming the set, rather than a bare TOML error.
///
/// # TOML Format
///
/// ```toml
/// [[sets]]
/// name = "fold"
/// curve = "wavefolder"
/// order = "first"
/// evaluation = "tables"
/// table_size = 16384
/// fold_amount = 2.5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetConfig {
    /// Set name, unique within the preset.
    pub name: String,

    /// Curve name (`hard_clip`, `soft_clip`, `tanh`, `half_wave`,
    /// `full_wave`, `wavefolder`).
    pub curve: String,

    /// `direct`, `first` or `second`.
    #[serde(default = "default_order")]
    pub order: String,

    /// `analytic` or `tables`.
    #[serde(default = "default_evaluation")]
    pub evaluation: String,

    /// Points in the `f` table when `evaluation = "tables"`.
    #[serde(default = "default_table_size")]
    pub table_size: usize,

    /// Wavefolder fold amount.
    #[serde(default)]
    pub fold_amount: f64,
}

fn default_order() -> String {
    Order::Second.name().to_string()
}

fn default_evaluation() -> String {
    Evaluation::Analytic.name().to_string()
}

fn default_table_size() -> usize {
    DEFAULT_TABLE_SIZE
}

impl SetConfig {
    /// Analytic second-order set for `curve`.
    pub fn new(name: impl Into<String>, curve: CurveKind) -> Self {
        Self {
            name: name.into(),
            curve: curve.name().to_string(),
            order: default_order(),
            evaluation: default_evaluation(),
            table_size: DEFAULT_TABLE_SIZE,
            fold_amount: 0.0,
        }
    }

    /// Set the antialiasing order.
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order.name().to_string();
        self
    }

    /// Switch to table-backed evaluation with `table_size` base points.
    pub fn with_tables(mut self, table_size: usize) -> Self {
        self.evaluation = Evaluation::Tables.name().to_string();
        self.table_size = table_size;
        self
    }

    /// Set the fold amount.
    pub fn with_fold_amount(mut self, fold_amount: f64) -> Self {
        self.fold_amount = fold_amount;
        self
    }

    /// Resolve names into a [`ShaperSpec`], checking every field.
    pub fn to_spec(&self) -> Result<ShaperSpec, ValidationError> {
        let curve: CurveKind = self
            .curve
            .parse()
            .map_err(|_| ValidationError::UnknownCurve {
                set: self.name.clone(),
                curve: self.curve.clone(),
            })?;

        let order = Order::from_name(&self.order).ok_or_else(|| ValidationError::UnknownOrder {
            set: self.name.clone(),
            order: self.order.clone(),
        })?;

        let evaluation = Evaluation::from_name(&self.evaluation).ok_or_else(|| {
            ValidationError::UnknownEvaluation {
                set: self.name.clone(),
                evaluation: self.evaluation.clone(),
            }
        })?;

        crate::validation::validate_table_size(&self.name, self.table_size)?;
        crate::validation::validate_fold_amount(&self.name, self.fold_amount)?;

        Ok(ShaperSpec::new(self.name.clone(), curve)
            .with_order(order)
            .with_evaluation(evaluation)
            .with_table_size(self.table_size)
            .with_fold_amount(self.fold_amount))
    }
}
