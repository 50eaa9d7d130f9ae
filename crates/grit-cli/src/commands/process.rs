//! File-based waveshaping command.

use crate::wav::{WavSpec, read_wav, write_wav};
use anyhow::Context;
use clap::Args;
use grit_config::{Preset, SetConfig, find_preset, get_factory_preset};
use grit_core::{CurveKind, DEFAULT_TABLE_SIZE, NlProcessor};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Curve to apply (see `grit curves`)
    #[arg(short, long, default_value = "tanh")]
    curve: String,

    /// Antialiasing order: direct, first or second
    #[arg(short, long, default_value = "second")]
    order: String,

    /// Evaluate the curve and its antiderivatives from lookup tables
    #[arg(long)]
    tables: bool,

    /// Base table size when --tables is set
    #[arg(long, default_value_t = DEFAULT_TABLE_SIZE)]
    table_size: usize,

    /// Wavefolder fold amount (0-16); overrides every set of a preset when given
    #[arg(long)]
    fold: Option<f64>,

    /// Factory preset name, user preset name, or path to a preset file (TOML)
    #[arg(short, long, value_name = "NAME|PATH", conflicts_with_all = ["curve", "order", "tables", "table_size"])]
    preset: Option<String>,

    /// Set to activate within the preset
    #[arg(long, requires = "preset")]
    set: Option<String>,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Gain applied before the shaper, in dB
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    input_gain_db: f32,

    /// Gain applied after the shaper, in dB
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    output_gain_db: f32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("--block-size must be at least 1");
    }

    println!("Reading {}...", args.input.display());
    let (mut buffers, spec) = read_wav(&args.input)?;
    let channels = buffers.len();
    let frames = buffers.first().map_or(0, Vec::len);

    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        frames,
        channels,
        spec.sample_rate,
        frames as f64 / f64::from(spec.sample_rate)
    );

    let preset = match &args.preset {
        Some(name) => {
            let mut preset = resolve_preset(name)?;
            if preset.channels != channels {
                tracing::info!(
                    preset_channels = preset.channels,
                    file_channels = channels,
                    "overriding preset channel count with the input file's"
                );
                preset.channels = channels;
            }
            if let Some(set) = &args.set {
                preset.active = Some(set.clone());
            }
            if let Some(fold) = args.fold {
                override_fold(&mut preset, fold);
            }
            preset
        }
        None => preset_from_args(&args, channels)?,
    };

    println!("Building {}...", preset.name);
    let mut processor = preset.build_processor()?;
    processor.prepare(f64::from(spec.sample_rate), args.block_size);

    if let Some(set) = processor.active_set() {
        let set_spec = set.spec();
        tracing::info!(
            set = set.name(),
            curve = %set_spec.curve,
            order = %set_spec.order,
            evaluation = %set_spec.evaluation,
            history = set.history_len(),
            "active shaper set"
        );
        println!(
            "Shaping with '{}' ({}, {} order, {})...",
            set.name(),
            set_spec.curve,
            set_spec.order,
            set_spec.evaluation
        );
    }

    let input_stats = Stats::measure(&buffers);

    apply_gain(&mut buffers, db_to_linear(args.input_gain_db));
    process_buffers(&mut processor, &mut buffers, args.block_size);
    apply_gain(&mut buffers, db_to_linear(args.output_gain_db));

    let output_stats = Stats::measure(&buffers);

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(input_stats.rms),
        linear_to_db(input_stats.peak)
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(output_stats.rms),
        linear_to_db(output_stats.peak)
    );

    let out_spec = WavSpec {
        channels: channels as u16,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &buffers, out_spec)?;
    println!("Done!");

    Ok(())
}

/// Look `name` up as a factory preset, then a user preset, then a path.
fn resolve_preset(name: &str) -> anyhow::Result<Preset> {
    if let Some(preset) = get_factory_preset(name) {
        tracing::info!(preset = %preset.name, "using factory preset");
        return Ok(preset);
    }

    let path = find_preset(name).with_context(|| format!("Preset not found: {name}"))?;
    tracing::info!(path = %path.display(), "loading preset");
    Ok(Preset::load(&path)?)
}

/// Set the fold amount of every set in `preset`, zero included.
fn override_fold(preset: &mut Preset, fold: f64) {
    tracing::info!(fold, "overriding preset fold amount");
    for set in &mut preset.sets {
        set.fold_amount = fold;
    }
}

/// Single-set preset described by the command-line flags.
fn preset_from_args(args: &ProcessArgs, channels: usize) -> anyhow::Result<Preset> {
    let curve: CurveKind = args
        .curve
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown curve: {} (see `grit curves`)", args.curve))?;

    let mut set =
        SetConfig::new(curve.name(), curve).with_fold_amount(args.fold.unwrap_or(0.0));
    set.order.clone_from(&args.order);
    if args.tables {
        set = set.with_tables(args.table_size);
    }

    Ok(Preset::new("command line")
        .with_channels(channels)
        .with_set(set))
}

/// Run `processor` over whole channel buffers, `block_size` frames at a time.
fn process_buffers(processor: &mut NlProcessor, buffers: &mut [Vec<f32>], block_size: usize) {
    let frames = buffers.first().map_or(0, Vec::len);

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );

    let mut start = 0;
    while start < frames {
        let end = (start + block_size).min(frames);
        let mut block: Vec<&mut [f32]> = buffers
            .iter_mut()
            .map(|buf| &mut buf[start..end])
            .collect();
        processor.process_block(&mut block);
        pb.set_position(end as u64);
        start = end;
    }

    pb.finish_with_message("done");
}

fn apply_gain(buffers: &mut [Vec<f32>], gain: f32) {
    if gain == 1.0 {
        return;
    }
    for sample in buffers.iter_mut().flatten() {
        *sample *= gain;
    }
}

struct Stats {
    rms: f32,
    peak: f32,
}

impl Stats {
    fn measure(buffers: &[Vec<f32>]) -> Self {
        let count: usize = buffers.iter().map(Vec::len).sum();
        if count == 0 {
            return Self {
                rms: 0.0,
                peak: 0.0,
            };
        }
        let sum: f64 = buffers
            .iter()
            .flatten()
            .map(|&s| f64::from(s) * f64::from(s))
            .sum();
        let peak = buffers.iter().flatten().map(|s| s.abs()).fold(0.0, f32::max);
        Self {
            rms: (sum / count as f64).sqrt() as f32,
            peak,
        }
    }
}

fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversions() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.0) - 0.501_187).abs() < 1e-5);
        assert!((linear_to_db(1.0)).abs() < 1e-6);
        assert_eq!(linear_to_db(0.0), -120.0);
    }

    #[test]
    fn stats_span_all_channels() {
        let stats = Stats::measure(&[vec![0.5, -0.5], vec![0.0, 1.0]]);
        assert_eq!(stats.peak, 1.0);
        assert!((stats.rms - (1.5_f32 / 4.0).sqrt()).abs() < 1e-6);
        assert_eq!(Stats::measure(&[]).peak, 0.0);
    }

    #[test]
    fn block_processing_covers_ragged_tail() {
        let mut processor = NlProcessor::new(2);
        processor.add_set(grit_core::ShaperSet::new(
            grit_core::ShaperSpec::new("tanh", CurveKind::Tanh)
                .with_order(grit_core::Order::Direct),
            2,
        ));
        processor.prepare(48000.0, 7);

        let mut buffers = vec![vec![2.0_f32; 20], vec![-2.0_f32; 20]];
        process_buffers(&mut processor, &mut buffers, 7);

        let expected = 2.0_f32.tanh();
        assert!(buffers[0].iter().all(|s| (s - expected).abs() < 1e-6));
        assert!(buffers[1].iter().all(|s| (s + expected).abs() < 1e-6));
    }

    #[test]
    fn fold_override_applies_zero() {
        let mut preset = Preset::new("fold")
            .with_set(SetConfig::new("fold", CurveKind::Wavefolder).with_fold_amount(3.0));
        override_fold(&mut preset, 0.0);
        assert_eq!(preset.sets[0].fold_amount, 0.0);
    }

    #[test]
    fn gain_is_applied_everywhere() {
        let mut buffers = vec![vec![1.0_f32; 3], vec![0.5_f32; 3]];
        apply_gain(&mut buffers, 2.0);
        assert_eq!(buffers, vec![vec![2.0; 3], vec![1.0; 3]]);
    }
}
