//! Multi-channel orchestration: named shaper sets and the processor that
//! switches between them.
//!
//! A [`ShaperSet`] is one configured curve (kind, order, evaluation
//! strategy) instantiated once per channel. An [`NlProcessor`] holds an
//! ordered list of sets with exactly one active; inactive sets stay built so
//! switching never allocates.
//!
//! # Lifecycle
//!
//! ```text
//! new ──▶ add_set ──▶ initialise ──▶ prepare ──▶ process_block …
//!                         ▲                          │
//!                         └── set_fold_amount ◀──────┘ (table-backed sets)
//! ```
//!
//! `initialise` and `prepare` allocate or do bulk work and belong off the
//! audio thread. `process_block`, `select` and analytic fold changes do not
//! allocate.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::adaa::{Adaa1, Adaa2, Direct};
use crate::nonlinearity::{Curve, CurveKind, MAX_FOLD_AMOUNT, Nonlinearity};
use crate::shaper::{AdaaShaper, Shaper};
use crate::table::{DEFAULT_TABLE_SIZE, Order, TableSet};

/// How a set evaluates its curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Evaluation {
    /// Closed-form `f`, `F₁`, `F₂` on every sample.
    #[default]
    Analytic,
    /// Interpolated lookup tables built by `initialise`.
    Tables,
}

impl Evaluation {
    /// Stable identifier used in presets and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Evaluation::Analytic => "analytic",
            Evaluation::Tables => "tables",
        }
    }

    /// Parse `analytic` or `tables` (`lut` is accepted as an alias).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "analytic" => Some(Evaluation::Analytic),
            "tables" | "table" | "lut" => Some(Evaluation::Tables),
            _ => None,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Description of a [`ShaperSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShaperSpec {
    /// Display name, unique within a processor.
    pub name: String,
    /// Which curve to evaluate.
    pub curve: CurveKind,
    /// Antialiasing order.
    pub order: Order,
    /// Closed forms or lookup tables.
    pub evaluation: Evaluation,
    /// Points in the `f` table; ignored by analytic sets.
    pub table_size: usize,
    /// Wavefolder fold amount; ignored by other curves.
    pub fold_amount: f64,
}

impl ShaperSpec {
    /// Analytic second-order spec for `curve`.
    pub fn new(name: impl Into<String>, curve: CurveKind) -> Self {
        Self {
            name: name.into(),
            curve,
            order: Order::Second,
            evaluation: Evaluation::Analytic,
            table_size: DEFAULT_TABLE_SIZE,
            fold_amount: 0.0,
        }
    }

    /// Set the antialiasing order.
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Set the evaluation strategy.
    pub fn with_evaluation(mut self, evaluation: Evaluation) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Set the base table size.
    pub fn with_table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    /// Set the fold amount.
    pub fn with_fold_amount(mut self, fold_amount: f64) -> Self {
        self.fold_amount = fold_amount;
        self
    }

    /// Curve value described by this spec.
    pub fn build_curve(&self) -> Curve {
        Curve::new(self.curve).with_fold_amount(self.fold_amount)
    }
}

fn engine<N>(order: Order, nl: N) -> Box<dyn Shaper>
where
    N: Nonlinearity + Send + 'static,
{
    match order {
        Order::Direct => Box::new(AdaaShaper::<N, Direct>::new(nl)),
        Order::First => Box::new(AdaaShaper::<N, Adaa1>::new(nl)),
        Order::Second => Box::new(AdaaShaper::<N, Adaa2>::new(nl)),
    }
}

/// One curve configuration instantiated per channel.
///
/// Table-backed sets start uninitialised: [`initialise`](Self::initialise)
/// builds one [`TableSet`] and gives every channel an `Arc` of it.
///
/// # Example
///
/// ```rust
/// use grit_core::{CurveKind, Evaluation, Order, ShaperSet, ShaperSpec};
///
/// let spec = ShaperSpec::new("tanh", CurveKind::Tanh)
///     .with_order(Order::First)
///     .with_evaluation(Evaluation::Tables)
///     .with_table_size(1024);
/// let mut set = ShaperSet::new(spec, 2);
/// assert!(set.needs_initialise());
///
/// set.initialise();
/// let mut left = [0.5_f32; 8];
/// let mut right = [-0.5_f32; 8];
/// set.process_block(&mut [&mut left[..], &mut right[..]]);
/// ```
pub struct ShaperSet {
    spec: ShaperSpec,
    channels: usize,
    engines: Vec<Box<dyn Shaper>>,
    tables: Option<Arc<TableSet>>,
    stale: bool,
}

impl fmt::Debug for ShaperSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaperSet")
            .field("spec", &self.spec)
            .field("channels", &self.channels)
            .field("initialised", &!self.engines.is_empty())
            .field("stale", &self.stale)
            .finish_non_exhaustive()
    }
}

impl ShaperSet {
    /// Build a set with one engine per channel.
    ///
    /// Analytic sets are ready immediately; table-backed sets need
    /// [`initialise`](Self::initialise) first.
    pub fn new(mut spec: ShaperSpec, channels: usize) -> Self {
        spec.fold_amount = clamp_fold(spec.fold_amount).unwrap_or(0.0);

        let engines = match spec.evaluation {
            Evaluation::Analytic => {
                let curve = spec.build_curve();
                (0..channels).map(|_| engine(spec.order, curve)).collect()
            }
            Evaluation::Tables => Vec::new(),
        };

        Self {
            spec,
            channels,
            engines,
            tables: None,
            stale: false,
        }
    }

    /// Set name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Configuration this set was built from, with the current fold amount.
    pub fn spec(&self) -> &ShaperSpec {
        &self.spec
    }

    /// Number of channel engines.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Transient length after a reset, in samples.
    pub fn history_len(&self) -> usize {
        match self.spec.order {
            Order::Direct => 0,
            Order::First => 1,
            Order::Second => 2,
        }
    }

    /// Shared tables, once built.
    pub fn tables(&self) -> Option<&TableSet> {
        self.tables.as_deref()
    }

    /// Whether the set can process audio.
    pub fn is_initialised(&self) -> bool {
        self.channels == 0 || !self.engines.is_empty()
    }

    /// Whether [`initialise`](Self::initialise) has work to do: tables were
    /// never built, or the fold amount changed since they were.
    pub fn needs_initialise(&self) -> bool {
        self.spec.evaluation == Evaluation::Tables && (self.tables.is_none() || self.stale)
    }

    /// Build (or rebuild stale) lookup tables and the engines reading them.
    ///
    /// Rebuilt engines start from zeroed history. No-op for analytic sets
    /// and for table-backed sets that are up to date.
    pub fn initialise(&mut self) {
        if !self.needs_initialise() {
            return;
        }

        let curve = self.spec.build_curve();
        let tables = Arc::new(TableSet::new(&curve, self.spec.order, self.spec.table_size));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            set = %self.spec.name,
            curve = %self.spec.curve,
            order = %self.spec.order,
            points = tables.total_points(),
            "built lookup tables"
        );

        self.engines = (0..self.channels)
            .map(|_| engine(self.spec.order, Arc::clone(&tables)))
            .collect();
        self.tables = Some(tables);
        self.stale = false;
    }

    /// Reset every channel engine.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        for engine in &mut self.engines {
            engine.prepare(sample_rate, max_block_size);
        }
    }

    /// Zero every channel's history.
    pub fn reset(&mut self) {
        for engine in &mut self.engines {
            engine.reset();
        }
    }

    /// Process one buffer per channel, in place.
    ///
    /// Buffers beyond the channel count are left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the set is table-backed and has never been initialised.
    pub fn process_block(&mut self, buffers: &mut [&mut [f32]]) {
        assert!(
            self.is_initialised(),
            "shaper set '{}' uses lookup tables and has not been initialised",
            self.spec.name
        );

        for (engine, buffer) in self.engines.iter_mut().zip(buffers.iter_mut()) {
            engine.process_block(buffer);
        }
    }

    /// Process a single sample on one channel, before output gain.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is out of range or the set is uninitialised.
    pub fn process_sample(&mut self, channel: usize, x: f64) -> f64 {
        assert!(
            self.is_initialised(),
            "shaper set '{}' uses lookup tables and has not been initialised",
            self.spec.name
        );
        self.engines[channel].process(x)
    }

    /// Change the fold amount of a wavefolder set.
    ///
    /// Analytic engines take the new value immediately. Table-backed sets
    /// keep processing with their current tables and report
    /// [`needs_initialise`](Self::needs_initialise) until rebuilt. Non-finite
    /// values are ignored; others clamp to `[0, MAX_FOLD_AMOUNT]`.
    pub fn set_fold_amount(&mut self, amount: f64) {
        if !self.spec.curve.has_fold_amount() {
            return;
        }
        let Some(amount) = clamp_fold(amount) else {
            return;
        };
        if amount == self.spec.fold_amount {
            return;
        }
        self.spec.fold_amount = amount;

        match self.spec.evaluation {
            Evaluation::Analytic => {
                for engine in &mut self.engines {
                    engine.set_fold_amount(amount);
                }
            }
            Evaluation::Tables => self.stale = true,
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(set = %self.spec.name, fold = amount, stale = self.stale, "fold amount");
    }
}

fn clamp_fold(amount: f64) -> Option<f64> {
    amount
        .is_finite()
        .then(|| amount.clamp(0.0, MAX_FOLD_AMOUNT))
}

/// Error returned when selecting a set that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    /// Index past the end of the set list.
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of sets.
        len: usize,
    },
    /// No set carries the requested name.
    UnknownName,
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectError::OutOfRange { index, len } => {
                write!(f, "set index {index} out of range ({len} sets)")
            }
            SelectError::UnknownName => f.write_str("no set with that name"),
        }
    }
}

impl core::error::Error for SelectError {}

/// Ordered collection of shaper sets with one active.
///
/// # Example
///
/// ```rust
/// use grit_core::{CurveKind, NlProcessor, ShaperSet, ShaperSpec};
///
/// let mut processor = NlProcessor::new(1);
/// processor.add_set(ShaperSet::new(ShaperSpec::new("clip", CurveKind::HardClip), 1));
/// processor.add_set(ShaperSet::new(ShaperSpec::new("tanh", CurveKind::Tanh), 1));
/// processor.select_by_name("tanh").unwrap();
/// processor.prepare(48_000.0, 64);
///
/// let mut mono = [0.25_f32; 64];
/// processor.process_block(&mut [&mut mono[..]]);
/// assert_eq!(processor.latency_samples(), 0.0);
/// ```
#[derive(Debug)]
pub struct NlProcessor {
    sets: Vec<ShaperSet>,
    active: usize,
    channels: usize,
    sample_rate: f64,
    max_block_size: usize,
}

impl NlProcessor {
    /// Empty processor for `channels` channels.
    pub fn new(channels: usize) -> Self {
        Self {
            sets: Vec::new(),
            active: 0,
            channels,
            sample_rate: 48_000.0,
            max_block_size: 512,
        }
    }

    /// Hard clip and tanh, second order, table-backed at the default size.
    ///
    /// The tables are not built yet; call [`initialise`](Self::initialise).
    pub fn standard(channels: usize) -> Self {
        let mut processor = Self::new(channels);
        for (name, curve) in [("hard clip", CurveKind::HardClip), ("tanh", CurveKind::Tanh)] {
            let spec = ShaperSpec::new(name, curve)
                .with_order(Order::Second)
                .with_evaluation(Evaluation::Tables);
            processor.add_set(ShaperSet::new(spec, channels));
        }
        processor
    }

    /// Append a set and return its index. The first set added is active.
    ///
    /// # Panics
    ///
    /// Panics if the set was built for a different channel count.
    pub fn add_set(&mut self, mut set: ShaperSet) -> usize {
        assert_eq!(
            set.channels(),
            self.channels,
            "set '{}' has {} channels, processor has {}",
            set.name(),
            set.channels(),
            self.channels
        );
        set.prepare(self.sample_rate, self.max_block_size);
        self.sets.push(set);
        self.sets.len() - 1
    }

    /// Make the set at `index` active.
    ///
    /// Switching to a different set zeroes its history, so it never resumes
    /// from samples it saw during an earlier activation.
    pub fn select(&mut self, index: usize) -> Result<(), SelectError> {
        if index >= self.sets.len() {
            return Err(SelectError::OutOfRange {
                index,
                len: self.sets.len(),
            });
        }
        if index != self.active {
            self.sets[index].reset();
            self.active = index;

            #[cfg(feature = "tracing")]
            tracing::debug!(index, set = %self.sets[index].name(), "selected set");
        }
        Ok(())
    }

    /// Make the first set named `name` active and return its index.
    pub fn select_by_name(&mut self, name: &str) -> Result<usize, SelectError> {
        let index = self
            .sets
            .iter()
            .position(|set| set.name() == name)
            .ok_or(SelectError::UnknownName)?;
        self.select(index)?;
        Ok(index)
    }

    /// Index of the active set.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The active set, if any sets exist.
    pub fn active_set(&self) -> Option<&ShaperSet> {
        self.sets.get(self.active)
    }

    /// All sets in insertion order.
    pub fn sets(&self) -> &[ShaperSet] {
        &self.sets
    }

    /// Mutable access to one set.
    pub fn set_mut(&mut self, index: usize) -> Option<&mut ShaperSet> {
        self.sets.get_mut(index)
    }

    /// Channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Build tables for every table-backed set that needs them.
    ///
    /// Only rebuilt sets start from zeroed history; analytic and up-to-date
    /// sets keep their state.
    pub fn initialise(&mut self) {
        for set in self.sets.iter_mut().filter(|set| set.needs_initialise()) {
            set.initialise();
            set.prepare(self.sample_rate, self.max_block_size);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(sets = self.sets.len(), "processor initialised");
    }

    /// Whether any set still needs [`initialise`](Self::initialise).
    pub fn needs_initialise(&self) -> bool {
        self.sets.iter().any(ShaperSet::needs_initialise)
    }

    /// Reset every engine in every set.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        for set in &mut self.sets {
            set.prepare(sample_rate, max_block_size);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, max_block_size, sets = self.sets.len(), "prepare");
    }

    /// Run the active set over one buffer per channel, in place.
    ///
    /// Buffers beyond the channel count are left untouched. With no sets the
    /// audio passes through unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the active set is table-backed and uninitialised.
    pub fn process_block(&mut self, buffers: &mut [&mut [f32]]) {
        if let Some(set) = self.sets.get_mut(self.active) {
            set.process_block(buffers);
        }
    }

    /// Added latency in samples, always zero.
    pub fn latency_samples(&self) -> f32 {
        0.0
    }

    /// Forward a fold amount to every set. Call between blocks.
    pub fn set_fold_amount(&mut self, amount: f64) {
        for set in &mut self.sets {
            set.set_fold_amount(amount);
        }
    }
}
