//! Per-channel waveshaping engines.
//!
//! The [`Shaper`] trait is the interface the processor drives: one engine
//! per channel, fed in sample order. [`AdaaShaper`] implements it for any
//! [`Nonlinearity`] paired with any [`Antialiasing`] recurrence.
//!
//! ## Design Decisions
//!
//! - **Object-safe**: the processor stores engines as `Box<dyn Shaper>` so
//!   sets with different curves, orders and evaluation strategies sit side
//!   by side. Inside an engine everything is statically dispatched.
//!
//! - **`f64` recurrences, `f32` buffers**: divided differences cancel
//!   digits, so [`process`](Shaper::process) works in `f64`.
//!   [`process_block`](Shaper::process_block) converts at the buffer edge.
//!
//! - **No allocations**: `process`, `process_block` and `set_fold_amount`
//!   never allocate and are safe on a real-time thread.

use crate::adaa::{Adaa1, Adaa2, Antialiasing, Direct};
use crate::nonlinearity::Nonlinearity;

/// A per-channel waveshaping engine.
///
/// # Example
///
/// ```rust
/// use grit_core::{Adaa2Shaper, HardClip, Shaper};
///
/// let mut shaper = Adaa2Shaper::new(HardClip);
/// shaper.prepare(48_000.0, 256);
///
/// let mut block = [0.0_f32, 0.5, 2.0, 2.0, 2.0];
/// shaper.process_block(&mut block);
/// assert!(block.iter().all(|s| s.abs() <= 1.0));
/// ```
pub trait Shaper: Send {
    /// Prepare for streaming.
    ///
    /// Resets the recurrence history. The sample rate is accepted for
    /// symmetry with the surrounding DSP graph; ADAA is independent of it.
    fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        let _ = (sample_rate, max_block_size);
        self.reset();
    }

    /// Zero the recurrence history without touching the curve.
    fn reset(&mut self);

    /// Process one sample, before output gain.
    fn process(&mut self, x: f64) -> f64;

    /// Gain the curve asks for after evaluation.
    fn output_gain(&self) -> f64 {
        1.0
    }

    /// Process a block in place, applying [`output_gain`](Self::output_gain).
    fn process_block(&mut self, buffer: &mut [f32]) {
        let gain = self.output_gain();
        for sample in buffer.iter_mut() {
            *sample = (self.process(f64::from(*sample)) * gain) as f32;
        }
    }

    /// Added latency in samples. ADAA adds none, only a transient after
    /// [`reset`](Self::reset).
    fn latency_samples(&self) -> f32 {
        0.0
    }

    /// Update the curve's fold amount. Call between blocks.
    fn set_fold_amount(&mut self, _amount: f64) {}

    /// Length of the transient after a reset, in samples.
    fn history_len(&self) -> usize;
}

/// A [`Nonlinearity`] evaluated through an [`Antialiasing`] recurrence.
///
/// `N` can be an analytic curve (`Curve`, `Tanh`, ...) or a shared table
/// set (`Arc<TableSet>`); the recurrence is identical either way.
#[derive(Debug, Clone, Default)]
pub struct AdaaShaper<N, A> {
    nl: N,
    state: A,
}

/// Plain evaluation, no antialiasing.
pub type DirectShaper<N> = AdaaShaper<N, Direct>;

/// First-order ADAA engine.
pub type Adaa1Shaper<N> = AdaaShaper<N, Adaa1>;

/// Second-order ADAA engine.
pub type Adaa2Shaper<N> = AdaaShaper<N, Adaa2>;

impl<N: Nonlinearity, A: Antialiasing> AdaaShaper<N, A> {
    /// Engine with zeroed history.
    pub fn new(nl: N) -> Self {
        Self {
            nl,
            state: A::default(),
        }
    }

    /// The curve being evaluated.
    pub fn nonlinearity(&self) -> &N {
        &self.nl
    }

    /// Current recurrence history.
    pub fn state(&self) -> &A {
        &self.state
    }
}

impl<N, A> Shaper for AdaaShaper<N, A>
where
    N: Nonlinearity + Send,
    A: Antialiasing,
{
    fn reset(&mut self) {
        self.state.reset();
    }

    #[inline]
    fn process(&mut self, x: f64) -> f64 {
        self.state.process(&self.nl, x)
    }

    fn output_gain(&self) -> f64 {
        self.nl.output_gain()
    }

    fn set_fold_amount(&mut self, amount: f64) {
        self.nl.set_fold_amount(amount);
    }

    fn history_len(&self) -> usize {
        A::HISTORY
    }
}
