//! Property-based tests for grit-core engines.
//!
//! ADAA outputs are weighted averages of `f` over the segment the input
//! travelled, so they can never exceed the curve's own range. These tests
//! check that bound for analytic and table-backed engines, finiteness for
//! large inputs, and table clamping, using proptest for randomized input
//! generation.

use grit_core::{
    Adaa1Shaper, Adaa2Shaper, Curve, CurveKind, DirectShaper, LookupTable, Nonlinearity, Order,
    Shaper, TableSet,
};
use proptest::prelude::*;
use std::sync::Arc;

/// Analytic engine for curve index `curve` (0..6) at order index `order` (0..3).
fn engine(curve: usize, order: usize, fold: f64) -> Box<dyn Shaper> {
    let curve = Curve::new(CurveKind::ALL[curve % CurveKind::ALL.len()]).with_fold_amount(fold);
    match order % 3 {
        0 => Box::new(DirectShaper::new(curve)),
        1 => Box::new(Adaa1Shaper::new(curve)),
        _ => Box::new(Adaa2Shaper::new(curve)),
    }
}

/// Table-backed engine over `curve`.
fn tabled(curve: &Curve, order: Order, size: usize) -> Box<dyn Shaper> {
    let tables = Arc::new(TableSet::new(curve, order, size));
    match order {
        Order::Direct => Box::new(DirectShaper::new(tables)),
        Order::First => Box::new(Adaa1Shaper::new(tables)),
        Order::Second => Box::new(Adaa2Shaper::new(tables)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every curve satisfies |f| <= 1, so for inputs in [-3, 3] every
    /// engine's output stays within 1 (up to cancellation rounding).
    #[test]
    fn output_bounded_by_curve_range(
        curve in 0usize..6,
        order in 0usize..3,
        fold in 0.0f64..4.0,
        input in prop::collection::vec(-3.0f64..=3.0, 1..256),
    ) {
        let mut shaper = engine(curve, order, fold);
        for &x in &input {
            let y = shaper.process(x);
            prop_assert!(
                y.is_finite() && y.abs() <= 1.0 + 1e-4,
                "curve {} order {} fold {}: output {} for input {}",
                curve, order, fold, y, x
            );
        }
    }

    /// Large but finite inputs never produce NaN or infinity.
    #[test]
    fn output_finite_for_large_inputs(
        curve in 0usize..6,
        order in 0usize..3,
        input in prop::collection::vec(-1.0e3f64..=1.0e3, 1..128),
    ) {
        let mut shaper = engine(curve, order, 1.0);
        for &x in &input {
            let y = shaper.process(x);
            prop_assert!(y.is_finite(), "curve {} order {}: output {} for input {}", curve, order, y, x);
        }
    }

    /// Repeating one value settles on f of that value once history fills.
    #[test]
    fn held_input_settles(curve in 0usize..6, order in 0usize..3, x in -5.0f64..5.0) {
        let mut shaper = engine(curve, order, 0.0);
        let history = shaper.history_len();
        let outputs: Vec<f64> = (0..4).map(|_| shaper.process(x)).collect();
        let expected = Curve::new(CurveKind::ALL[curve]).func(x);
        for &y in &outputs[history..] {
            prop_assert!((y - expected).abs() < 1e-12, "got {}, expected {}", y, expected);
        }
    }

    /// A lookup table never returns values outside its sampled range.
    #[test]
    fn table_output_within_sampled_range(x in prop::num::f64::ANY) {
        let table = LookupTable::new(libm::tanh, -10.0, 10.0, 1024);
        let y = table.evaluate(x);
        prop_assert!(y.is_finite());
        prop_assert!((-1.0..=1.0).contains(&y), "tanh table gave {} for {}", y, x);
    }

    /// Table-backed engines average the interpolated curve, which never
    /// leaves [-1, 1], so their output is bounded like the analytic one,
    /// including past the table domain.
    #[test]
    fn table_engine_bounded_beyond_domain(
        curve in 0usize..6,
        order in 0usize..3,
        input in prop::collection::vec(-1.0e3f64..=1.0e3, 1..128),
    ) {
        let curve = Curve::new(CurveKind::ALL[curve]).with_fold_amount(1.0);
        let order = Order::ALL[order];
        let mut shaper = tabled(&curve, order, 256);
        for &x in &input {
            let y = shaper.process(x);
            prop_assert!(
                y.is_finite() && y.abs() <= 1.0 + 1e-4,
                "{:?} {}: output {} for input {}",
                curve, order, y, x
            );
        }
    }

    /// Slow creeping input stays inside the curve range too.
    #[test]
    fn table_engine_bounded_on_small_steps(
        curve in 0usize..6,
        start in -3.0f64..3.0,
        steps in prop::collection::vec(-5e-4f64..=5e-4, 1..256),
    ) {
        let curve = Curve::new(CurveKind::ALL[curve]);
        let mut shaper = tabled(&curve, Order::Second, 1024);
        let mut x = start;
        let _ = shaper.process(x);
        let _ = shaper.process(x);
        for &step in &steps {
            x += step;
            let y = shaper.process(x);
            prop_assert!(y.abs() <= 1.0 + 1e-4, "{:?}: output {} at {}", curve, y, x);
        }
    }

    /// Table-backed engines stay finite for inputs far beyond the tables.
    #[test]
    fn table_engine_finite_beyond_domain(
        order in 0usize..3,
        input in prop::collection::vec(-1.0e6f64..=1.0e6, 1..64),
    ) {
        let mut shaper = tabled(&Curve::new(CurveKind::Tanh), Order::ALL[order], 256);
        for &x in &input {
            prop_assert!(shaper.process(x).is_finite());
        }
    }
}
