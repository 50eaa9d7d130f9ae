//! Grit Core - antiderivative-antialiased waveshaping
//!
//! Memoryless distortion curves aliasing badly when evaluated sample by
//! sample: `f(x)` generates harmonics far above Nyquist that fold back into
//! the audible band. This crate evaluates finite differences of the curves'
//! closed-form antiderivatives instead (Antiderivative Antialiasing, ADAA),
//! which suppresses that aliasing without oversampling.
//!
//! # Core Abstractions
//!
//! ## Curves
//!
//! - [`Nonlinearity`] - Transfer function plus first and second antiderivatives
//! - [`HardClip`], [`SoftClip`], [`Tanh`], [`HalfWaveTanh`], [`FullWaveTanh`],
//!   [`Wavefolder`] - Built-in curves
//! - [`Curve`] / [`CurveKind`] - Runtime-selectable curve and its name tag
//!
//! ## Recurrences
//!
//! - [`Direct`] - Plain evaluation, the aliasing reference
//! - [`Adaa1`] - First-order ADAA
//! - [`Adaa2`] - Second-order ADAA
//!
//! ## Lookup Tables
//!
//! - [`LookupTable`] - Clamped, linearly interpolated function samples
//! - [`TableSet`] - Table stand-ins for a curve's `f`, `F₁`, `F₂`
//!
//! ## Processing
//!
//! - [`Shaper`] - Object-safe per-channel engine
//! - [`AdaaShaper`] - A curve driven by a recurrence
//! - [`ShaperSet`] - One configured curve instantiated per channel
//! - [`NlProcessor`] - Ordered sets, one active
//!
//! # no_std Support
//!
//! The crate is `no_std` + `alloc` with `libm` for math. Disable the default
//! `std` feature:
//!
//! ```toml
//! [dependencies]
//! grit-core = { version = "0.1", default-features = false }
//! ```
//!
//! The optional `tracing` feature logs configuration changes (prepare, table
//! builds, set selection). Nothing is logged per sample.
//!
//! # Example
//!
//! ```rust
//! use grit_core::NlProcessor;
//!
//! let mut processor = NlProcessor::standard(2);
//! processor.initialise();
//! processor.prepare(48_000.0, 128);
//!
//! let mut left = [0.0_f32; 128];
//! let mut right = [0.0_f32; 128];
//! for (i, (l, r)) in left.iter_mut().zip(right.iter_mut()).enumerate() {
//!     let phase = i as f32 / 48.0 * core::f32::consts::TAU;
//!     *l = 2.0 * phase.sin();
//!     *r = 2.0 * phase.cos();
//! }
//!
//! processor.select_by_name("tanh").unwrap();
//! processor.process_block(&mut [&mut left[..], &mut right[..]]);
//! assert!(left.iter().all(|s| s.abs() <= 1.0 + 1e-3));
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation, locks or I/O in processing paths
//! - **Static inside, dynamic at the edge**: engines are generic over curve
//!   and recurrence; the processor holds them as `Box<dyn Shaper>`
//! - **Explicit tables**: no global state; tables are built by `initialise`
//!   and owned by the set that reads them

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod adaa;
pub mod dilog;
pub mod lut;
pub mod nonlinearity;
pub mod processor;
pub mod shaper;
pub mod table;

// Re-export main types at crate root
pub use adaa::{Adaa1, Adaa2, Antialiasing, Direct, TOLERANCE};
pub use lut::LookupTable;
pub use nonlinearity::{
    Curve, CurveKind, FullWaveTanh, HalfWaveTanh, HardClip, MAX_FOLD_AMOUNT, Nonlinearity,
    ParseCurveError, SOFT_CLIP_OUTPUT_GAIN, SoftClip, Tanh, Wavefolder,
};
pub use processor::{Evaluation, NlProcessor, SelectError, ShaperSet, ShaperSpec};
pub use shaper::{AdaaShaper, Adaa1Shaper, Adaa2Shaper, DirectShaper, Shaper};
pub use table::{DEFAULT_TABLE_SIZE, MAX_TABLE_SIZE, MIN_TABLE_SIZE, Order, TableSet};
