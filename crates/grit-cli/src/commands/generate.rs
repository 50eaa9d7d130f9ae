//! Test signal generation command.

use crate::wav::{WavSpec, write_wav};
use clap::Args;
use std::f64::consts::TAU;
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Frequency in Hz
    #[arg(long, default_value = "1000.0")]
    freq: f64,

    /// Peak amplitude; values above 1 drive the shaper harder
    #[arg(long, default_value = "0.8")]
    amplitude: f64,

    /// Duration in seconds
    #[arg(long, default_value = "2.0")]
    duration: f64,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Number of (identical) channels
    #[arg(long, default_value = "1")]
    channels: u16,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    if args.sample_rate == 0 {
        anyhow::bail!("--sample-rate must be positive");
    }
    if !(args.duration >= 0.0 && args.duration.is_finite()) {
        anyhow::bail!("--duration must be a non-negative number of seconds");
    }
    if args.channels == 0 {
        anyhow::bail!("--channels must be at least 1");
    }

    let nyquist = f64::from(args.sample_rate) / 2.0;
    if args.freq >= nyquist {
        tracing::warn!(
            freq = args.freq,
            nyquist,
            "frequency at or above Nyquist, the tone will alias"
        );
    }

    let frames = (args.duration * f64::from(args.sample_rate)).round() as usize;
    let samples = sine(args.freq, args.amplitude, f64::from(args.sample_rate), frames);

    // Float output: amplitudes above 1 survive the round trip.
    let spec = WavSpec {
        channels: args.channels,
        sample_rate: args.sample_rate,
        bits_per_sample: 32,
    };
    let buffers = vec![samples; usize::from(args.channels)];

    println!(
        "Generating {:.1} Hz sine, amplitude {}, {:.2}s at {} Hz",
        args.freq, args.amplitude, args.duration, args.sample_rate
    );
    write_wav(&args.output, &buffers, spec)?;
    println!("Saved to {}", args.output.display());

    Ok(())
}

/// Sine with phase computed per sample in `f64`, free of accumulated drift.
fn sine(freq: f64, amplitude: f64, sample_rate: f64, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|n| (amplitude * (TAU * freq * n as f64 / sample_rate).sin()) as f32)
        .collect()
}
