//! Interpolating lookup tables over a bounded domain.
//!
//! A [`LookupTable`] samples a scalar function at evenly spaced points once,
//! at construction, and afterwards answers queries by linear interpolation
//! between the two enclosing points. Tables stand in for transcendental
//! function calls in the table-backed shapers (see [`crate::table`]).
//!
//! # Domain Handling
//!
//! Inputs outside `[min, max]` are clamped to the nearest edge before
//! interpolation. A table never extrapolates, so pathological inputs degrade
//! accuracy rather than producing `NaN` or `Inf`. A `NaN` input evaluates the
//! lower edge.
//!
//! # Accuracy
//!
//! For a source with bounded second derivative, linear interpolation with
//! point spacing `h` has a worst-case error of `h² / 8 · max|f''|`.

use alloc::boxed::Box;

/// Function sampled over `[min, max]` and evaluated by linear interpolation.
///
/// The backing storage is allocated once and never resized; a table is
/// immutable after [`new`](Self::new) returns and can be shared across
/// threads by reference.
///
/// # Example
///
/// ```rust
/// use grit_core::LookupTable;
///
/// let table = LookupTable::new(|x| x * x, -1.0, 1.0, 2001);
/// assert!((table.evaluate(0.5) - 0.25).abs() < 1e-6);
///
/// // Out-of-domain inputs clamp to the edge.
/// assert_eq!(table.evaluate(4.0), table.evaluate(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct LookupTable {
    /// Sampled function values, `data[i] = f(min + i * step)`.
    data: Box<[f64]>,
    /// Lower domain edge.
    min: f64,
    /// Upper domain edge.
    max: f64,
    /// Distance between adjacent sample points.
    step: f64,
    /// Table points per unit of input, `(len - 1) / (max - min)`.
    scale: f64,
}

impl LookupTable {
    /// Sample `source` at `size` evenly spaced points across `[min, max]`.
    ///
    /// Both edges are sampled exactly.
    ///
    /// # Panics
    ///
    /// Panics if `size < 2` or if the domain is empty or not finite.
    pub fn new<F>(source: F, min: f64, max: f64, size: usize) -> Self
    where
        F: Fn(f64) -> f64,
    {
        assert!(size >= 2, "lookup table needs at least two points, got {size}");
        assert!(
            min.is_finite() && max.is_finite() && min < max,
            "lookup table domain must be a finite, non-empty interval, got [{min}, {max}]"
        );

        let last = size - 1;
        let step = (max - min) / last as f64;
        let data: Box<[f64]> = (0..size)
            .map(|i| {
                let x = if i == last { max } else { min + step * i as f64 };
                source(x)
            })
            .collect();

        Self {
            data,
            min,
            max,
            step,
            scale: last as f64 / (max - min),
        }
    }

    /// Evaluate the table at `x`, clamping to the domain first.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        // max/min rather than clamp: a NaN input lands on `min`.
        let x = x.max(self.min).min(self.max);
        let pos = (x - self.min) * self.scale;

        let index = (pos as usize).min(self.data.len() - 2);
        let frac = pos - index as f64;

        let a = self.data[index];
        let b = self.data[index + 1];
        a + frac * (b - a)
    }

    /// Index `i` of the interval `[knot(i), knot(i + 1)]` holding `x`, after
    /// clamping. Always below `size() - 1`.
    #[inline]
    pub fn interval(&self, x: f64) -> usize {
        let x = x.max(self.min).min(self.max);
        (((x - self.min) * self.scale) as usize).min(self.data.len() - 2)
    }

    /// Input at which point `i` was sampled.
    #[inline]
    pub fn knot(&self, i: usize) -> f64 {
        if i + 1 == self.data.len() {
            self.max
        } else {
            self.min + self.step * i as f64
        }
    }

    /// Sampled values, one per knot.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Domain covered by the table as `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Number of sampled points.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Distance between adjacent sample points.
    pub fn step(&self) -> f64 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_at_sample_points() {
        let table = LookupTable::new(|x| 3.0 * x - 1.0, -2.0, 2.0, 5);
        for (i, x) in [-2.0, -1.0, 0.0, 1.0, 2.0].iter().enumerate() {
            let expected = 3.0 * x - 1.0;
            assert!(
                (table.evaluate(*x) - expected).abs() < 1e-12,
                "point {i}: got {}, expected {expected}",
                table.evaluate(*x)
            );
        }
    }

    #[test]
    fn linear_between_points() {
        // Two points: the whole domain is one interval.
        let table = LookupTable::new(|x| x * x, 0.0, 1.0, 2);
        assert!((table.evaluate(0.25) - 0.25).abs() < 1e-12);
        assert!((table.evaluate(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clamps_outside_domain() {
        let table = LookupTable::new(libm::sin, -1.0, 1.0, 64);
        assert_eq!(table.evaluate(-50.0), table.evaluate(-1.0));
        assert_eq!(table.evaluate(50.0), table.evaluate(1.0));
        assert_eq!(table.evaluate(f64::INFINITY), table.evaluate(1.0));
        assert_eq!(table.evaluate(f64::NEG_INFINITY), table.evaluate(-1.0));
    }

    #[test]
    fn nan_evaluates_lower_edge() {
        let table = LookupTable::new(|x| x, -3.0, 3.0, 16);
        assert_eq!(table.evaluate(f64::NAN), -3.0);
    }

    #[test]
    fn interpolation_error_within_bound() {
        let size = 1025;
        let table = LookupTable::new(libm::sin, -4.0, 4.0, size);
        let h = table.step();
        // |sin''| <= 1
        let bound = h * h / 8.0 + 1e-15;

        for i in 0..10_000 {
            let x = -4.0 + 8.0 * (i as f64 + 0.37) / 10_000.0;
            let err = (table.evaluate(x) - libm::sin(x)).abs();
            assert!(err <= bound, "x={x}: error {err} exceeds {bound}");
        }
    }

    #[test]
    fn reports_geometry() {
        let table = LookupTable::new(|x| x, -10.0, 10.0, 201);
        assert_eq!(table.domain(), (-10.0, 10.0));
        assert_eq!(table.size(), 201);
        assert!((table.step() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn knots_and_intervals_agree() {
        let table = LookupTable::new(|x| 2.0 * x, -1.0, 1.0, 9);
        assert_eq!(table.knot(0), -1.0);
        assert_eq!(table.knot(4), 0.0);
        assert_eq!(table.knot(8), 1.0);
        assert_eq!(table.values()[8], 2.0);

        assert_eq!(table.interval(-1.0), 0);
        assert_eq!(table.interval(0.1), 4);
        assert_eq!(table.interval(1.0), 7);
        assert_eq!(table.interval(9.0), 7);
        assert_eq!(table.interval(f64::NAN), 0);
    }

    #[test]
    #[should_panic]
    fn rejects_single_point() {
        let _ = LookupTable::new(|x| x, 0.0, 1.0, 1);
    }

    #[test]
    #[should_panic]
    fn rejects_empty_domain() {
        let _ = LookupTable::new(|x| x, 1.0, 1.0, 8);
    }
}
