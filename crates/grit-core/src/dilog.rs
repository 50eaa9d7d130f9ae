//! Dilogarithm and the tanh antiderivatives built on it.
//!
//! The second antiderivative of `tanh` has no elementary closed form; it is
//! expressed through the real dilogarithm
//!
//! ```text
//! Li₂(z) = −∫₀^z ln(1 − t) / t dt
//! ```
//!
//! [`li2`] evaluates `Li₂` on the whole real line below 1 (and above, real
//! part) with a rational approximation after mapping the argument into
//! `[0, 1/2]` through the standard reflection and inversion identities.
//!
//! Reference: A. Voigt, "Efficient and accurate implementation of the
//! dilogarithm", arXiv:2201.01678 (maximum error ~5e-17 on `[0, 1/2]`).

use core::f64::consts::{LN_2, PI};
use libm::{exp, fabs, log, log1p};

const PI2_6: f64 = PI * PI / 6.0;

/// Numerator coefficients, lowest order first.
const P: [f64; 6] = [
    0.999_999_999_999_999_950_2,
    -2.688_392_681_856_542_343,
    2.647_722_269_947_310_969_2,
    -1.153_855_960_788_741_635_5,
    2.088_607_779_502_060_783_7e-1,
    -1.085_977_713_415_246_308_4e-2,
];

/// Denominator coefficients, lowest order first.
const Q: [f64; 7] = [
    1.0,
    -2.938_392_681_856_563_548_5,
    3.271_209_329_301_863_538_9,
    -1.707_670_217_395_428_942_1,
    4.159_601_722_840_060_383_6e-1,
    -3.980_134_375_408_448_295_6e-2,
    8.274_366_897_446_665_903_5e-4,
];

#[inline]
fn horner(y: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * y + c)
}

/// Real dilogarithm `Li₂(x)`.
///
/// For `x > 1` the real part is returned.
///
/// # Example
///
/// ```rust
/// use grit_core::dilog::li2;
///
/// let pi2_12 = core::f64::consts::PI.powi(2) / 12.0;
/// assert!((li2(-1.0) + pi2_12).abs() < 1e-15);
/// ```
pub fn li2(x: f64) -> f64 {
    // Map to y in [0, 1/2]: Li₂(x) = r + s · y · P(y)/Q(y)
    let (y, r, s) = if x < -1.0 {
        let l = log(1.0 - x);
        (1.0 / (1.0 - x), -PI2_6 + l * (0.5 * l - log(-x)), 1.0)
    } else if x == -1.0 {
        return -PI2_6 / 2.0;
    } else if x < 0.0 {
        let l = log1p(-x);
        (x / (x - 1.0), -0.5 * l * l, -1.0)
    } else if x == 0.0 {
        return 0.0;
    } else if x < 0.5 {
        (x, 0.0, 1.0)
    } else if x < 1.0 {
        (1.0 - x, PI2_6 - log(x) * log1p(-x), -1.0)
    } else if x == 1.0 {
        return PI2_6;
    } else if x < 2.0 {
        let l = log(x);
        let y = 1.0 - 1.0 / x;
        (y, PI2_6 - l * (log(y) + 0.5 * l), 1.0)
    } else {
        let l = log(x);
        (1.0 / x, 2.0 * PI2_6 - 0.5 * l * l, -1.0)
    };

    r + s * y * horner(y, &P) / horner(y, &Q)
}

/// `ln(cosh(x))` without overflowing `cosh` for large `|x|`.
///
/// Uses `ln cosh x = |x| + ln(1 + e^{−2|x|}) − ln 2`.
#[inline]
pub fn log_cosh(x: f64) -> f64 {
    let a = fabs(x);
    a + log1p(exp(-2.0 * a)) - LN_2
}

/// Second antiderivative of `tanh`, anchored so that `tanh_ad2(0) = 0`.
///
/// For `x ≥ 0`:
///
/// ```text
/// G(x) = ½ (Li₂(−e^{−2x}) + x² − 2x ln 2) + π²/24
/// ```
///
/// `G` is the integral of the even function `ln cosh` from 0, so it is odd
/// and negative arguments use `G(x) = −G(−x)`. The dilogarithm argument then
/// always lies in `[−1, 0)`.
#[inline]
pub fn tanh_ad2(x: f64) -> f64 {
    if x < 0.0 {
        return -tanh_ad2_positive(-x);
    }
    tanh_ad2_positive(x)
}

#[inline]
fn tanh_ad2_positive(x: f64) -> f64 {
    0.5 * (li2(-exp(-2.0 * x)) + x * x - 2.0 * x * LN_2) + PI * PI / 24.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn li2_special_values() {
        assert_eq!(li2(0.0), 0.0);
        assert!((li2(1.0) - PI * PI / 6.0).abs() < 1e-15);
        assert!((li2(-1.0) + PI * PI / 12.0).abs() < 1e-15);

        // Li₂(1/2) = π²/12 − ln²2 / 2
        let half = PI * PI / 12.0 - 0.5 * LN_2 * LN_2;
        assert!((li2(0.5) - half).abs() < 1e-14, "Li2(1/2) = {}", li2(0.5));
    }

    #[test]
    fn li2_matches_power_series_near_zero() {
        // Li₂(x) = Σ x^k / k²  for |x| < 1
        for &x in &[-0.4, -0.1, 0.05, 0.2, 0.45] {
            let series: f64 = (1..200)
                .map(|k| libm::pow(x, k as f64) / (k * k) as f64)
                .sum();
            assert!(
                (li2(x) - series).abs() < 1e-14,
                "Li2({x}) = {} vs series {series}",
                li2(x)
            );
        }
    }

    #[test]
    fn li2_reflection_identity() {
        // Li₂(x) + Li₂(1 − x) = π²/6 − ln x · ln(1 − x)
        for &x in &[0.1, 0.3, 0.6, 0.9] {
            let lhs = li2(x) + li2(1.0 - x);
            let rhs = PI * PI / 6.0 - log(x) * log(1.0 - x);
            assert!((lhs - rhs).abs() < 1e-13, "x={x}: {lhs} vs {rhs}");
        }
    }

    #[test]
    fn li2_inversion_identity() {
        // Li₂(x) + Li₂(1/x) = −π²/6 − ln²(−x) / 2  for x < 0
        for &x in &[-0.5, -2.0, -7.5, -100.0] {
            let lhs = li2(x) + li2(1.0 / x);
            let l = log(-x);
            let rhs = -PI * PI / 6.0 - 0.5 * l * l;
            assert!((lhs - rhs).abs() < 1e-12, "x={x}: {lhs} vs {rhs}");
        }
    }

    #[test]
    fn log_cosh_matches_direct_form() {
        for &x in &[-5.0, -1.0, -0.1, 0.0, 0.3, 2.0, 8.0] {
            let direct = log(libm::cosh(x));
            assert!((log_cosh(x) - direct).abs() < 1e-14, "x={x}");
        }
        // Stays finite where cosh overflows.
        assert!((log_cosh(1000.0) - (1000.0 - LN_2)).abs() < 1e-9);
    }

    #[test]
    fn tanh_ad2_anchored_and_odd() {
        assert!(tanh_ad2(0.0).abs() < 1e-15);
        for &x in &[0.01, 0.5, 1.0, 3.0, 12.0] {
            assert!((tanh_ad2(x) + tanh_ad2(-x)).abs() < 1e-12);
        }
    }

    #[test]
    fn tanh_ad2_derivative_is_log_cosh() {
        let h = 1e-4;
        for i in 0..=80 {
            let x = -20.0 + 0.5 * i as f64;
            let numeric = (tanh_ad2(x + h) - tanh_ad2(x - h)) / (2.0 * h);
            assert!(
                (numeric - log_cosh(x)).abs() < 1e-6,
                "x={x}: d/dx = {numeric}, ln cosh = {}",
                log_cosh(x)
            );
        }
    }
}
