//! Lookup-table stand-ins for a curve and its antiderivatives.
//!
//! A [`TableSet`] samples `f` of a source [`Nonlinearity`] once, then
//! implements [`Nonlinearity`] itself. Plugging a table set into the same
//! recurrences as the analytic curve trades memory and build time for
//! cheaper evaluation of transcendental curves (`tanh`'s `F₂` needs a
//! dilogarithm per sample).
//!
//! # Antiderivatives
//!
//! `F₁` and `F₂` are not sampled from the source's closed forms. They are
//! the exact integrals of the piecewise-linear `f` interpolant: piecewise
//! quadratic and cubic on the same knots, stored as their knot values and
//! evaluated with the matching polynomial inside each interval. Every
//! divided difference the recurrences take is then an exact average of the
//! interpolated `f`, so table-backed output stays inside the range of `f`
//! however close consecutive inputs are. Independently interpolated
//! antiderivative tables do not have this property: their interpolation
//! error is divided by the input step (twice, for second order) and spikes
//! on slow signals.
//!
//! # Domains
//!
//! | Table | Domain | Points |
//! |-------|--------|--------|
//! | `f` | `[−10, 10]` | `base_size`, rounded up to odd |
//! | `F₁` | same knots | same |
//! | `F₂` | same knots | same |
//!
//! The point count is odd so `x = 0` is a knot: kinks at zero (full-wave and
//! half-wave curves) are reproduced exactly and both antiderivatives are
//! anchored there to the source's values. Past the domain `f` clamps to its
//! edge value; `F₁` and `F₂` continue as its exact integrals (linear and
//! quadratic), so the recurrences stay consistent for any finite input.
//!
//! # Sharing
//!
//! A table set is immutable once built and is `Send + Sync`; wrap it in an
//! [`Arc`](alloc::sync::Arc) and hand a clone to every channel of a set.
//! `Arc<TableSet>` implements [`Nonlinearity`] too.

use alloc::boxed::Box;
use alloc::vec;

use crate::lut::LookupTable;
use crate::nonlinearity::Nonlinearity;

/// Upper edge of the `f` table domain; the lower edge is its negation.
pub const BASE_DOMAIN: f64 = 10.0;

/// Default number of points in the `f` table.
///
/// A knot spacing of ~3e-4 keeps table-backed output within `h²/8 · |f''|`
/// of the analytic engine on smooth curves and within `h/4` next to a kink.
pub const DEFAULT_TABLE_SIZE: usize = 1 << 16;

/// Smallest accepted `base_size`.
pub const MIN_TABLE_SIZE: usize = 16;

/// Largest accepted `base_size`.
pub const MAX_TABLE_SIZE: usize = 1 << 22;

/// Which antiderivatives a recurrence reads, and so which tables to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Plain evaluation of `f`.
    Direct,
    /// First-order ADAA: `f` and `F₁`.
    First,
    /// Second-order ADAA: `f`, `F₁` and `F₂`.
    #[default]
    Second,
}

impl Order {
    /// Every order, lowest first.
    pub const ALL: [Order; 3] = [Order::Direct, Order::First, Order::Second];

    /// Stable identifier used in presets and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Order::Direct => "direct",
            Order::First => "first",
            Order::Second => "second",
        }
    }

    /// Parse `direct`/`first`/`second` (or `0`/`1`/`2`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "direct" | "none" | "0" => Some(Order::Direct),
            "first" | "1" => Some(Order::First),
            "second" | "2" => Some(Order::Second),
            _ => None,
        }
    }
}

impl core::fmt::Display for Order {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup tables standing in for a curve's `f`, `F₁` and `F₂`.
///
/// # Example
///
/// ```rust
/// use grit_core::{Nonlinearity, Order, TableSet, Tanh};
///
/// let tables = TableSet::new(&Tanh, Order::First, 4096);
/// assert!((tables.func(0.5) - Tanh.func(0.5)).abs() < 1e-4);
/// assert!((tables.ad1(0.5) - Tanh.ad1(0.5)).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct TableSet {
    func: LookupTable,
    /// `F₁` at each knot of `func`.
    ad1: Option<Box<[f64]>>,
    /// `F₂` at each knot of `func`.
    ad2: Option<Box<[f64]>>,
    output_gain: f64,
    order: Order,
}

impl TableSet {
    /// Sample `source` and integrate the tables `order` needs.
    ///
    /// # Panics
    ///
    /// Panics if `base_size` is outside `[MIN_TABLE_SIZE, MAX_TABLE_SIZE]`.
    pub fn new<N: Nonlinearity + ?Sized>(source: &N, order: Order, base_size: usize) -> Self {
        assert!(
            (MIN_TABLE_SIZE..=MAX_TABLE_SIZE).contains(&base_size),
            "table size {base_size} outside [{MIN_TABLE_SIZE}, {MAX_TABLE_SIZE}]"
        );

        let points = base_size | 1;
        let func = LookupTable::new(|x| source.func(x), -BASE_DOMAIN, BASE_DOMAIN, points);

        let (ad1, ad2) = match order {
            Order::Direct => (None, None),
            Order::First => {
                let (ad1, _) = integrate(&func, source, false);
                (Some(ad1), None)
            }
            Order::Second => {
                let (ad1, ad2) = integrate(&func, source, true);
                (Some(ad1), ad2)
            }
        };

        Self {
            func,
            ad1,
            ad2,
            output_gain: source.output_gain(),
            order,
        }
    }

    /// Highest order these tables can serve.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Number of knots in the `f` table.
    pub fn base_size(&self) -> usize {
        self.func.size()
    }

    /// Total number of stored points across all tables.
    pub fn total_points(&self) -> usize {
        self.func.size()
            + self.ad1.as_ref().map_or(0, |t| t.len())
            + self.ad2.as_ref().map_or(0, |t| t.len())
    }

    /// Domain of the `f` table.
    pub fn domain(&self) -> (f64, f64) {
        self.func.domain()
    }

    /// Knot index, offset from that knot, and `f` slope of the piece
    /// holding `x`. Past the domain the piece is the edge knot with zero
    /// slope.
    #[inline]
    fn piece(&self, x: f64) -> (usize, f64, f64) {
        let (min, max) = self.func.domain();
        if x >= max {
            (self.func.size() - 1, x - max, 0.0)
        } else if x > min {
            let i = self.func.interval(x);
            let (slope, _) = cell(&self.func, i);
            (i, x - self.func.knot(i), slope)
        } else if x.is_nan() {
            (0, 0.0, 0.0)
        } else {
            (0, x - min, 0.0)
        }
    }
}

/// Slope of `f` across interval `i`, and the interval's width.
#[inline]
fn cell(func: &LookupTable, i: usize) -> (f64, f64) {
    let width = func.knot(i + 1) - func.knot(i);
    let values = func.values();
    ((values[i + 1] - values[i]) / width, width)
}

/// `F₁` at offset `t` into a piece starting at `f`, `F₁` with slope `slope`.
#[inline]
fn integral1(f: f64, slope: f64, ad1: f64, t: f64) -> f64 {
    ad1 + t * (f + 0.5 * slope * t)
}

/// `F₂` at offset `t` into a piece starting at `f`, `F₁`, `F₂`.
#[inline]
fn integral2(f: f64, slope: f64, ad1: f64, ad2: f64, t: f64) -> f64 {
    ad2 + t * (ad1 + t * (0.5 * f + slope * t / 6.0))
}

/// Knot values of `F₁` (and `F₂` when `second`), integrated outwards from
/// the centre knot, which takes the source's values.
///
/// Each knot is the previous piece evaluated at its far end, using the same
/// expressions as lookup, so adjacent pieces meet without a step.
fn integrate<N: Nonlinearity + ?Sized>(
    func: &LookupTable,
    source: &N,
    second: bool,
) -> (Box<[f64]>, Option<Box<[f64]>>) {
    let values = func.values();
    let size = values.len();
    let centre = size / 2;

    let mut ad1 = vec![0.0; size];
    let mut ad2 = vec![0.0; size];
    ad1[centre] = source.ad1(func.knot(centre));
    if second {
        ad2[centre] = source.ad2(func.knot(centre));
    }

    for i in centre..size - 1 {
        let (slope, width) = cell(func, i);
        ad1[i + 1] = integral1(values[i], slope, ad1[i], width);
        if second {
            ad2[i + 1] = integral2(values[i], slope, ad1[i], ad2[i], width);
        }
    }
    for i in (0..centre).rev() {
        let (slope, width) = cell(func, i);
        ad1[i] = ad1[i + 1] - integral1(values[i], slope, 0.0, width);
        if second {
            ad2[i] = ad2[i + 1] - integral2(values[i], slope, ad1[i], 0.0, width);
        }
    }

    (ad1.into_boxed_slice(), second.then(|| ad2.into_boxed_slice()))
}

impl Nonlinearity for TableSet {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        self.func.evaluate(x)
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        let Some(ad1) = &self.ad1 else {
            panic!("F1 table not built: table set was created for direct evaluation");
        };
        let (i, t, slope) = self.piece(x);
        integral1(self.func.values()[i], slope, ad1[i], t)
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        let (Some(ad1), Some(ad2)) = (&self.ad1, &self.ad2) else {
            panic!("F2 table not built: table set was created for {} order", self.order);
        };
        let (i, t, slope) = self.piece(x);
        integral2(self.func.values()[i], slope, ad1[i], ad2[i], t)
    }

    fn output_gain(&self) -> f64 {
        self.output_gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonlinearity::{FullWaveTanh, HardClip, SoftClip, Tanh};

    #[test]
    fn builds_tables_for_order() {
        let direct = TableSet::new(&Tanh, Order::Direct, 64);
        assert_eq!(direct.total_points(), 65);

        let first = TableSet::new(&Tanh, Order::First, 64);
        assert_eq!(first.total_points(), 2 * 65);

        let second = TableSet::new(&Tanh, Order::Second, 65);
        assert_eq!(second.total_points(), 3 * 65);
        assert_eq!(second.base_size(), 65);
        assert_eq!(second.order(), Order::Second);
        assert_eq!(second.domain(), (-BASE_DOMAIN, BASE_DOMAIN));
    }

    #[test]
    fn tables_track_source() {
        let tables = TableSet::new(&HardClip, Order::Second, 4096);
        for i in 0..=200 {
            let x = -5.0 + 0.05 * f64::from(i);
            // The kink at ±1 costs up to h/4 in the f table, and its area
            // carries into the integrals.
            assert!((tables.func(x) - HardClip.func(x)).abs() < 2e-3, "func at {x}");
            assert!((tables.ad1(x) - HardClip.ad1(x)).abs() < 1e-5, "ad1 at {x}");
            assert!((tables.ad2(x) - HardClip.ad2(x)).abs() < 1e-4, "ad2 at {x}");
        }
    }

    #[test]
    fn anchored_at_zero() {
        for size in [64, 65, 4096] {
            let tables = TableSet::new(&FullWaveTanh, Order::Second, size);
            assert!(tables.ad1(0.0).abs() < 1e-15, "size {size}");
            assert!(tables.ad2(0.0).abs() < 1e-15, "size {size}");
            // Zero is a knot, so the full-wave kink is exact.
            assert!(tables.func(0.0).abs() < 1e-15, "size {size}");
        }
    }

    #[test]
    fn pieces_meet_at_knots() {
        let tables = TableSet::new(&Tanh, Order::Second, 256);
        let h = 2.0 * BASE_DOMAIN / 256.0;
        for i in 1..256 {
            let knot = -BASE_DOMAIN + h * f64::from(i);
            let (below, above) = (knot - 1e-13, knot + 1e-13);
            assert!((tables.ad1(below) - tables.ad1(above)).abs() < 1e-11, "ad1 at {knot}");
            assert!((tables.ad2(below) - tables.ad2(above)).abs() < 1e-11, "ad2 at {knot}");
        }
    }

    #[test]
    fn divided_differences_stay_in_range() {
        // Steps far below the knot spacing: each quotient is an average of
        // the interpolated f, so it cannot leave [-1, 1].
        let tables = TableSet::new(&HardClip, Order::Second, 1024);
        for i in 0..2000 {
            let x = -3.0 + 3e-3 * f64::from(i);
            for step in [3e-5, 1e-4, 7e-3] {
                let d1 = (tables.ad1(x + step) - tables.ad1(x)) / step;
                assert!(d1.abs() <= 1.0 + 1e-9, "F1 quotient {d1} at {x}");

                let d2 = (tables.ad2(x + step) - tables.ad2(x)) / step;
                let d2_prev = (tables.ad2(x) - tables.ad2(x - step)) / step;
                let y = (d2 - d2_prev) / step;
                assert!(y.abs() <= 1.0 + 1e-4, "F2 second quotient {y} at {x}");
            }
        }
    }

    #[test]
    fn edge_value_beyond_domain() {
        let tables = TableSet::new(&HardClip, Order::Second, 4096);
        assert_eq!(tables.func(1e6), tables.func(BASE_DOMAIN));
        assert_eq!(tables.func(-1e6), tables.func(-BASE_DOMAIN));
        assert!(tables.func(f64::NAN).is_finite());
        assert!(tables.ad1(f64::NAN).is_finite());
        assert!(tables.ad2(f64::NAN).is_finite());

        // Past the edge f is constant, so F1 grows linearly and F2
        // quadratically, matching the closed forms of the hard clip.
        for x in [12.0, 25.0, -40.0] {
            assert!((tables.ad1(x) - HardClip.ad1(x)).abs() < 1e-5, "ad1 at {x}");
            assert!((tables.ad2(x) - HardClip.ad2(x)).abs() < 1e-3, "ad2 at {x}");
        }
        let slope = tables.ad1(101.0) - tables.ad1(100.0);
        assert!((slope - 1.0).abs() < 1e-9);
    }

    #[test]
    fn copies_output_gain() {
        let tables = TableSet::new(&SoftClip, Order::First, 64);
        assert_eq!(tables.output_gain(), SoftClip.output_gain());
    }

    #[test]
    #[should_panic]
    fn missing_second_antiderivative_panics() {
        let tables = TableSet::new(&Tanh, Order::First, 64);
        let _ = tables.ad2(0.5);
    }

    #[test]
    #[should_panic]
    fn rejects_tiny_table() {
        let _ = TableSet::new(&Tanh, Order::First, 4);
    }

    #[test]
    fn order_names_round_trip() {
        for order in Order::ALL {
            assert_eq!(Order::from_name(order.name()), Some(order));
        }
        assert_eq!(Order::from_name("2"), Some(Order::Second));
        assert_eq!(Order::from_name("third"), None);
    }
}
