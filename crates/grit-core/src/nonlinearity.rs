//! Waveshaping curves with closed-form antiderivatives.
//!
//! Every curve implements [`Nonlinearity`]: the transfer function itself
//! plus its first and second antiderivatives, which the antialiasing
//! recurrences in [`crate::adaa`] difference instead of sampling `f`
//! directly.
//!
//! | Curve | `f(x)` | Character |
//! |-------|--------|-----------|
//! | [`HardClip`] | `clamp(x, −1, 1)` | Harsh, flat tops |
//! | [`SoftClip`] | `sin(πx/2)` inside ±1, `sgn x` outside | Rounded knee, output × 0.8 |
//! | [`Tanh`] | `tanh x` | Smooth saturation |
//! | [`HalfWaveTanh`] | `tanh x` for `x > 0`, else 0 | Rectified, even harmonics |
//! | [`FullWaveTanh`] | `\|tanh x\|` | Octave-up rectifier |
//! | [`Wavefolder`] | `sin(π/2 · x · (1 + m))` | Folding, fold amount `m` |
//!
//! # Anchoring
//!
//! Antiderivatives are only defined up to a constant. All curves here pick
//! the constants so that `ad1(0) = ad2(0) = 0`, which makes a zeroed
//! recurrence state equivalent to "the previous input was silence".
//!
//! Non-smooth curves (hard clip) still antialias: the first antiderivative
//! is one order smoother than `f`, the second two orders.

use core::f64::consts::{FRAC_2_PI, FRAC_PI_2, PI};
use core::fmt;
use core::str::FromStr;

use alloc::sync::Arc;
use libm::{copysign, cos, sin, tanh};

use crate::dilog::{log_cosh, tanh_ad2};

/// A memoryless transfer function with its first two antiderivatives.
///
/// Implementations must satisfy `ad1' = func` and `ad2' = ad1`, and should
/// anchor both antiderivatives at zero (`ad1(0) = ad2(0) = 0`).
pub trait Nonlinearity {
    /// The transfer function `f(x)`.
    fn func(&self, x: f64) -> f64;

    /// First antiderivative `F₁(x)`, with `F₁' = f`.
    fn ad1(&self, x: f64) -> f64;

    /// Second antiderivative `F₂(x)`, with `F₂' = F₁`.
    fn ad2(&self, x: f64) -> f64;

    /// Gain applied to the processed signal after evaluation.
    ///
    /// Only the soft clipper deviates from unity.
    fn output_gain(&self) -> f64 {
        1.0
    }

    /// Update the fold amount of a parameterised curve.
    ///
    /// No-op for curves without a parameter.
    fn set_fold_amount(&mut self, _amount: f64) {}
}

impl<N: Nonlinearity + ?Sized> Nonlinearity for &N {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        (**self).func(x)
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        (**self).ad1(x)
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        (**self).ad2(x)
    }

    fn output_gain(&self) -> f64 {
        (**self).output_gain()
    }
}

/// Shared curves (typically a [`TableSet`](crate::TableSet)) are read-only,
/// so `set_fold_amount` stays the default no-op.
impl<N: Nonlinearity + ?Sized> Nonlinearity for Arc<N> {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        (**self).func(x)
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        (**self).ad1(x)
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        (**self).ad2(x)
    }

    fn output_gain(&self) -> f64 {
        (**self).output_gain()
    }
}

/// Hard clipper, `f(x) = clamp(x, −1, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HardClip;

impl Nonlinearity for HardClip {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        x.clamp(-1.0, 1.0)
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        if x.abs() <= 1.0 {
            0.5 * x * x
        } else {
            x.abs() - 0.5
        }
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        if x.abs() <= 1.0 {
            x * x * x / 6.0
        } else {
            (0.5 * x * x + 1.0 / 6.0) * x.signum() - 0.5 * x
        }
    }
}

/// Output level applied after the soft clipper.
pub const SOFT_CLIP_OUTPUT_GAIN: f64 = 0.8;

/// `1/2 − 4/π²`, the outer-branch offset of the soft clipper's `F₂`.
const SOFT_CLIP_AD2_OFFSET: f64 = 0.5 - 4.0 / (PI * PI);

/// Sine-segment soft clipper.
///
/// `f(x) = sin(πx/2)` for `|x| ≤ 1` and `sgn x` beyond, so `f` and `f'` are
/// both continuous at the knee. The processed signal is scaled by
/// [`SOFT_CLIP_OUTPUT_GAIN`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoftClip;

impl Nonlinearity for SoftClip {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        if x.abs() <= 1.0 {
            sin(FRAC_PI_2 * x)
        } else {
            x.signum()
        }
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        if x.abs() <= 1.0 {
            FRAC_2_PI * (1.0 - cos(FRAC_PI_2 * x))
        } else {
            x.abs() + FRAC_2_PI - 1.0
        }
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        if x.abs() <= 1.0 {
            (2.0 * PI * x - 4.0 * sin(FRAC_PI_2 * x)) / (PI * PI)
        } else {
            let s = x.signum();
            ((4.0 - 2.0 * PI) * x + PI * x * x * s) / (2.0 * PI) + SOFT_CLIP_AD2_OFFSET * s
        }
    }

    fn output_gain(&self) -> f64 {
        SOFT_CLIP_OUTPUT_GAIN
    }
}

/// Hyperbolic tangent saturator.
///
/// `F₁ = ln cosh x`; `F₂` goes through the dilogarithm (see
/// [`tanh_ad2`](crate::dilog::tanh_ad2)).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tanh;

impl Nonlinearity for Tanh {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        tanh(x)
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        log_cosh(x)
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        tanh_ad2(x)
    }
}

/// Half-wave rectified tanh: `tanh x` for `x > 0`, silence otherwise.
///
/// Both tanh antiderivatives vanish at zero, so continuing them with the
/// constant 0 on the negative half keeps them continuous.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HalfWaveTanh;

impl Nonlinearity for HalfWaveTanh {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        if x > 0.0 { tanh(x) } else { 0.0 }
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        if x > 0.0 { log_cosh(x) } else { 0.0 }
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        if x > 0.0 { tanh_ad2(x) } else { 0.0 }
    }
}

/// Full-wave rectified tanh, `f(x) = |tanh x|`.
///
/// `F₁(x) = sgn(x) · ln cosh x` is odd. `F₂(x) = G(|x|)`, where `G` is the
/// tanh second antiderivative: for `x < 0`, `d/dx G(−x) = −ln cosh x`, which
/// is `F₁(x)`. `F₂` is even and `F₂(0) = 0`, so no offset is needed at the
/// seam.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FullWaveTanh;

impl Nonlinearity for FullWaveTanh {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        tanh(x.abs())
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        copysign(log_cosh(x), x)
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        tanh_ad2(x.abs())
    }
}

/// Largest accepted wavefolder fold amount.
pub const MAX_FOLD_AMOUNT: f64 = 16.0;

/// Sine wavefolder, `f(x) = sin(π/2 · x · (1 + m))`.
///
/// `m` is the fold amount: at `m = 0` the curve is a single sine segment
/// over `[−1, 1]`; larger values fold the input more times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wavefolder {
    /// Fold amount `m`, within `[0, MAX_FOLD_AMOUNT]`.
    fold: f64,
    /// `π/2 · (1 + m)`
    omega: f64,
}

impl Default for Wavefolder {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Wavefolder {
    /// Create a wavefolder with the given fold amount (clamped to
    /// `[0, MAX_FOLD_AMOUNT]`).
    pub fn new(fold: f64) -> Self {
        let mut folder = Self {
            fold: 0.0,
            omega: FRAC_PI_2,
        };
        folder.set_fold_amount(fold);
        folder
    }

    /// Current fold amount.
    pub fn fold_amount(&self) -> f64 {
        self.fold
    }
}

impl Nonlinearity for Wavefolder {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        sin(self.omega * x)
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        (1.0 - cos(self.omega * x)) / self.omega
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        (x - sin(self.omega * x) / self.omega) / self.omega
    }

    fn set_fold_amount(&mut self, amount: f64) {
        // Non-finite values are ignored rather than poisoning the recurrence
        if !amount.is_finite() {
            return;
        }
        self.fold = amount.clamp(0.0, MAX_FOLD_AMOUNT);
        self.omega = FRAC_PI_2 * (1.0 + self.fold);
    }
}

/// Parameter-free tag naming one of the built-in curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    /// [`HardClip`]
    HardClip,
    /// [`SoftClip`]
    SoftClip,
    /// [`Tanh`]
    Tanh,
    /// [`HalfWaveTanh`]
    HalfWave,
    /// [`FullWaveTanh`]
    FullWave,
    /// [`Wavefolder`]
    Wavefolder,
}

impl CurveKind {
    /// Every built-in curve, in display order.
    pub const ALL: [CurveKind; 6] = [
        CurveKind::HardClip,
        CurveKind::SoftClip,
        CurveKind::Tanh,
        CurveKind::HalfWave,
        CurveKind::FullWave,
        CurveKind::Wavefolder,
    ];

    /// Stable identifier used in presets and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            CurveKind::HardClip => "hard_clip",
            CurveKind::SoftClip => "soft_clip",
            CurveKind::Tanh => "tanh",
            CurveKind::HalfWave => "half_wave",
            CurveKind::FullWave => "full_wave",
            CurveKind::Wavefolder => "wavefolder",
        }
    }

    /// One-line human-readable description.
    pub const fn description(self) -> &'static str {
        match self {
            CurveKind::HardClip => "hard clipper, clamp to [-1, 1]",
            CurveKind::SoftClip => "sine-segment soft clipper (output x0.8)",
            CurveKind::Tanh => "hyperbolic tangent saturation",
            CurveKind::HalfWave => "half-wave rectified tanh",
            CurveKind::FullWave => "full-wave rectified tanh",
            CurveKind::Wavefolder => "sine wavefolder with fold amount",
        }
    }

    /// Whether the curve reads the fold amount.
    pub const fn has_fold_amount(self) -> bool {
        matches!(self, CurveKind::Wavefolder)
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a curve name does not match any [`CurveKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseCurveError;

impl fmt::Display for ParseCurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown curve name")
    }
}

impl core::error::Error for ParseCurveError {}

impl FromStr for CurveKind {
    type Err = ParseCurveError;

    /// Parse a curve name. Case, `-` and `_` are ignored, so `hard_clip`,
    /// `Hard-Clip` and `hardclip` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut buf = [0u8; 16];
        let mut len = 0;
        for b in s.bytes().filter(|b| *b != b'_' && *b != b'-') {
            if len == buf.len() {
                return Err(ParseCurveError);
            }
            buf[len] = b.to_ascii_lowercase();
            len += 1;
        }

        match &buf[..len] {
            b"hardclip" | b"clip" => Ok(CurveKind::HardClip),
            b"softclip" => Ok(CurveKind::SoftClip),
            b"tanh" => Ok(CurveKind::Tanh),
            b"halfwave" | b"halfwavetanh" => Ok(CurveKind::HalfWave),
            b"fullwave" | b"fullwavetanh" => Ok(CurveKind::FullWave),
            b"wavefolder" | b"folder" | b"fold" => Ok(CurveKind::Wavefolder),
            _ => Err(ParseCurveError),
        }
    }
}

/// One of the built-in curves, selectable at runtime.
///
/// Dispatch is a `match` over a closed set, so a `Curve` can be stored by
/// value in per-channel engines without boxing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    /// [`HardClip`]
    HardClip(HardClip),
    /// [`SoftClip`]
    SoftClip(SoftClip),
    /// [`Tanh`]
    Tanh(Tanh),
    /// [`HalfWaveTanh`]
    HalfWave(HalfWaveTanh),
    /// [`FullWaveTanh`]
    FullWave(FullWaveTanh),
    /// [`Wavefolder`]
    Wavefolder(Wavefolder),
}

impl Curve {
    /// Default-parameter curve for `kind`.
    pub fn new(kind: CurveKind) -> Self {
        match kind {
            CurveKind::HardClip => Curve::HardClip(HardClip),
            CurveKind::SoftClip => Curve::SoftClip(SoftClip),
            CurveKind::Tanh => Curve::Tanh(Tanh),
            CurveKind::HalfWave => Curve::HalfWave(HalfWaveTanh),
            CurveKind::FullWave => Curve::FullWave(FullWaveTanh),
            CurveKind::Wavefolder => Curve::Wavefolder(Wavefolder::default()),
        }
    }

    /// Builder-style fold amount; ignored by curves without one.
    pub fn with_fold_amount(mut self, amount: f64) -> Self {
        self.set_fold_amount(amount);
        self
    }

    /// Tag of this curve.
    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::HardClip(_) => CurveKind::HardClip,
            Curve::SoftClip(_) => CurveKind::SoftClip,
            Curve::Tanh(_) => CurveKind::Tanh,
            Curve::HalfWave(_) => CurveKind::HalfWave,
            Curve::FullWave(_) => CurveKind::FullWave,
            Curve::Wavefolder(_) => CurveKind::Wavefolder,
        }
    }
}

impl From<CurveKind> for Curve {
    fn from(kind: CurveKind) -> Self {
        Curve::new(kind)
    }
}

macro_rules! dispatch {
    ($self:expr, $nl:ident => $body:expr) => {
        match $self {
            Curve::HardClip($nl) => $body,
            Curve::SoftClip($nl) => $body,
            Curve::Tanh($nl) => $body,
            Curve::HalfWave($nl) => $body,
            Curve::FullWave($nl) => $body,
            Curve::Wavefolder($nl) => $body,
        }
    };
}

impl Nonlinearity for Curve {
    #[inline]
    fn func(&self, x: f64) -> f64 {
        dispatch!(self, nl => nl.func(x))
    }

    #[inline]
    fn ad1(&self, x: f64) -> f64 {
        dispatch!(self, nl => nl.ad1(x))
    }

    #[inline]
    fn ad2(&self, x: f64) -> f64 {
        dispatch!(self, nl => nl.ad2(x))
    }

    fn output_gain(&self) -> f64 {
        dispatch!(self, nl => nl.output_gain())
    }

    fn set_fold_amount(&mut self, amount: f64) {
        dispatch!(self, nl => nl.set_fold_amount(amount))
    }
}
