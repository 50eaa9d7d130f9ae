//! Anti-Derivative Anti-Aliasing (ADAA) recurrences.
//!
//! ADAA reduces aliasing in nonlinear waveshaping by reformulating the
//! waveshaper as a continuous-time convolution, then discretizing.  Instead
//! of evaluating `f(x)` directly, first-order ADAA computes:
//!
//! ```text
//! y[n] = (F₁(x[n]) − F₁(x[n−1])) / (x[n] − x[n−1])
//! ```
//!
//! where `F₁` is the first antiderivative of the waveshaping function `f`:
//! the average of `f` over the segment the signal just travelled.  Second
//! order differences the second antiderivative `F₂` twice, which averages `f`
//! with a triangular kernel spanning three samples:
//!
//! ```text
//! d[n] = (F₂(x[n]) − F₂(x[n−1])) / (x[n] − x[n−1])
//! y[n] = 2 / (x[n] − x[n−2]) · (d[n] − d[n−1])
//! ```
//!
//! # Ill-Conditioning
//!
//! When the samples in a divided difference are closer than [`TOLERANCE`],
//! the quotient suffers from catastrophic cancellation.  Each difference
//! then falls back to its limit, evaluated at the midpoint of the samples
//! (`f` for first order, `F₁` for the inner second-order difference, and a
//! dedicated expansion for the outer one).  The fallbacks are the designed
//! degenerate case, not an error: outputs never become `NaN` from a
//! near-zero denominator.
//!
//! # State
//!
//! The recurrences here hold only per-channel history.  The curve (or the
//! table set standing in for it) is passed in on every call, so one curve
//! can serve any number of channels.  After [`reset`](Antialiasing::reset)
//! the history reads as silence; the first [`HISTORY`](Antialiasing::HISTORY)
//! outputs are a transient.
//!
//! # Reference
//!
//! Parker et al., "Reducing the Aliasing of Nonlinear Waveshaping Using
//! Continuous-Time Convolution", DAFx-2016.
//! Bilbao et al., "Antiderivative Antialiasing for Memoryless
//! Nonlinearities", IEEE Signal Processing Letters 24(7), 2017.
//!
//! # Example
//!
//! ```rust
//! use grit_core::adaa::{Adaa1, Antialiasing};
//! use grit_core::Tanh;
//!
//! let mut adaa = Adaa1::default();
//! let output = adaa.process(&Tanh, 0.5);
//! assert!(output.abs() < 1.0);
//! ```

use crate::nonlinearity::Nonlinearity;

/// Minimum input difference for a divided-difference quotient.
///
/// Below this threshold the recurrences use their midpoint fallbacks.
pub const TOLERANCE: f64 = 1.0e-5;

/// A per-channel evaluation recurrence for a [`Nonlinearity`].
pub trait Antialiasing: Default + Send {
    /// Samples of history the recurrence carries, i.e. the length of the
    /// transient after a reset.
    const HISTORY: usize;

    /// Advance by one sample.
    fn process<N: Nonlinearity + ?Sized>(&mut self, nl: &N, x: f64) -> f64;

    /// Zero the history.
    fn reset(&mut self);
}

/// Plain evaluation of `f(x)`, without antialiasing.
///
/// Carries no state; used as the aliasing reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Direct;

impl Antialiasing for Direct {
    const HISTORY: usize = 0;

    #[inline]
    fn process<N: Nonlinearity + ?Sized>(&mut self, nl: &N, x: f64) -> f64 {
        nl.func(x)
    }

    fn reset(&mut self) {}
}

/// First-order ADAA recurrence.
///
/// # Epsilon and Midpoint Fallback
///
/// When `|x[n] − x[n−1]| < TOLERANCE` the processor evaluates the
/// waveshaper at the midpoint `(x[n] + x[n−1]) / 2`, the L'Hôpital limit of
/// the quotient as `x[n] → x[n−1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Adaa1 {
    /// Previous input sample.
    x1: f64,
    /// First antiderivative evaluated at the previous input.
    ad1_x1: f64,
}

impl Antialiasing for Adaa1 {
    const HISTORY: usize = 1;

    #[inline]
    fn process<N: Nonlinearity + ?Sized>(&mut self, nl: &N, x: f64) -> f64 {
        let ad1_x = nl.ad1(x);
        let diff = x - self.x1;

        let y = if diff.abs() < TOLERANCE {
            nl.func(0.5 * (x + self.x1))
        } else {
            (ad1_x - self.ad1_x1) / diff
        };

        self.x1 = x;
        self.ad1_x1 = ad1_x;
        y
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.ad1_x1 = 0.0;
    }
}

/// Second-order ADAA recurrence.
///
/// Output is effectively centred on the previous input: a step reaches its
/// settled value one sample later than with [`Adaa1`]. In a linear region of
/// `f` the output is `f` of the mean of the last three inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Adaa2 {
    /// Previous input sample `x[n−1]`.
    x1: f64,
    /// Input two samples back `x[n−2]`.
    x2: f64,
    /// Second antiderivative at `x[n−1]`.
    ad2_x1: f64,
    /// Inner divided difference from the previous call.
    d2: f64,
}

impl Adaa2 {
    /// Inner divided difference of `F₂` between `x` and `x[n−1]`.
    #[inline]
    fn divided_difference<N: Nonlinearity + ?Sized>(&self, nl: &N, x: f64, ad2_x: f64) -> f64 {
        let diff = x - self.x1;
        if diff.abs() < TOLERANCE {
            nl.ad1(0.5 * (x + self.x1))
        } else {
            (ad2_x - self.ad2_x1) / diff
        }
    }

    /// Outer difference for `x ≈ x[n−2]`: the triangular average collapses
    /// onto the segment between `x̄ = (x + x[n−2]) / 2` and `x[n−1]`.
    #[inline]
    fn fallback<N: Nonlinearity + ?Sized>(&self, nl: &N, x: f64) -> f64 {
        let x_bar = 0.5 * (x + self.x2);
        let delta = x_bar - self.x1;

        if delta.abs() < TOLERANCE {
            nl.func(0.5 * (x_bar + self.x1))
        } else {
            (2.0 / delta) * (nl.ad1(x_bar) + (self.ad2_x1 - nl.ad2(x_bar)) / delta)
        }
    }
}

impl Antialiasing for Adaa2 {
    const HISTORY: usize = 2;

    #[inline]
    fn process<N: Nonlinearity + ?Sized>(&mut self, nl: &N, x: f64) -> f64 {
        let ad2_x = nl.ad2(x);
        let d1 = self.divided_difference(nl, x, ad2_x);

        let diff = x - self.x2;
        let y = if diff.abs() < TOLERANCE {
            self.fallback(nl, x)
        } else {
            (2.0 / diff) * (d1 - self.d2)
        };

        self.d2 = d1;
        self.x2 = self.x1;
        self.x1 = x;
        self.ad2_x1 = ad2_x;
        y
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.ad2_x1 = 0.0;
        self.d2 = 0.0;
    }
}
