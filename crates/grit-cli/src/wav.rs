//! Multichannel WAV reading and writing.
//!
//! Samples are exchanged as one `Vec<f32>` per channel, the layout
//! [`NlProcessor::process_block`](grit_core::NlProcessor::process_block)
//! consumes.

use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Errors from WAV I/O.
#[derive(Debug, thiserror::Error)]
pub enum WavError {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Bit depth other than 16, 24 or 32 requested for output.
    #[error("Unsupported bit depth: {0} (expected 16, 24, or 32)")]
    UnsupportedBitDepth(u16),

    /// Channel buffers passed for writing differ in length.
    #[error("Channel length mismatch: channel {channel} has {len} samples, expected {expected}")]
    ChannelLengthMismatch {
        /// Offending channel index.
        channel: usize,
        /// Its length.
        len: usize,
        /// Length of channel 0.
        expected: usize,
    },

    /// Nothing to write.
    #[error("No channels to write")]
    NoChannels,
}

/// Convenience result type for WAV I/O.
pub type Result<T> = std::result::Result<T, WavError>;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32; 32 is written as float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file into one buffer per channel.
///
/// Integer samples are scaled to `[-1, 1)`.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f32>>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let hound_spec = reader.spec();
    let spec = WavSpec::from(hound_spec);
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match hound_spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    Ok((deinterleave(&interleaved, channels), spec))
}

/// Write one buffer per channel to a WAV file.
///
/// `spec.channels` is taken from `buffers.len()`.
pub fn write_wav<P: AsRef<Path>>(path: P, buffers: &[Vec<f32>], spec: WavSpec) -> Result<()> {
    if !matches!(spec.bits_per_sample, 16 | 24 | 32) {
        return Err(WavError::UnsupportedBitDepth(spec.bits_per_sample));
    }
    let Some(first) = buffers.first() else {
        return Err(WavError::NoChannels);
    };
    let frames = first.len();
    if let Some((channel, buf)) = buffers
        .iter()
        .enumerate()
        .find(|(_, buf)| buf.len() != frames)
    {
        return Err(WavError::ChannelLengthMismatch {
            channel,
            len: buf.len(),
            expected: frames,
        });
    }

    let spec = WavSpec {
        channels: buffers.len() as u16,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for frame in 0..frames {
            for buf in buffers {
                writer.write_sample(buf[frame])?;
            }
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        for frame in 0..frames {
            for buf in buffers {
                let int_sample = (buf[frame] * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

fn deinterleave(interleaved: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = interleaved.len() / channels;
    let mut buffers = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (buf, &sample) in buffers.iter_mut().zip(frame) {
            buf.push(sample);
        }
    }
    buffers
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_roundtrip_stereo_f32() {
        let left: Vec<f32> = (0..1000).map(|i| (i as f32 / 100.0).sin()).collect();
        let right: Vec<f32> = left.iter().map(|s| -s * 0.5).collect();

        let file = NamedTempFile::new().unwrap();
        write_wav(
            file.path(),
            &[left.clone(), right.clone()],
            WavSpec::default(),
        )
        .unwrap();

        let (loaded, spec) = read_wav(file.path()).unwrap();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(loaded, vec![left, right]);
    }

    #[test]
    fn test_roundtrip_i16() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0).sin() * 0.9).collect();
        let spec = WavSpec {
            sample_rate: 44100,
            bits_per_sample: 16,
            ..Default::default()
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &[samples.clone()], spec).unwrap();

        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec.sample_rate, 44100);
        assert_eq!(loaded_spec.bits_per_sample, 16);
        assert_eq!(loaded.len(), 1);

        // 16-bit has less precision
        for (a, b) in samples.iter().zip(loaded[0].iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn test_int_output_clamps() {
        let spec = WavSpec {
            bits_per_sample: 24,
            ..Default::default()
        };
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &[vec![2.0, -2.0]], spec).unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        assert!(loaded[0][0] < 1.0 && loaded[0][0] > 0.999);
        assert_eq!(loaded[0][1], -1.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            bits_per_sample: 8,
            ..Default::default()
        };
        assert!(matches!(
            write_wav(file.path(), &[vec![0.0]], spec),
            Err(WavError::UnsupportedBitDepth(8))
        ));
        assert!(matches!(
            write_wav(file.path(), &[], WavSpec::default()),
            Err(WavError::NoChannels)
        ));
        assert!(matches!(
            write_wav(file.path(), &[vec![0.0; 3], vec![0.0; 2]], WavSpec::default()),
            Err(WavError::ChannelLengthMismatch { channel: 1, .. })
        ));
    }

    #[test]
    fn test_deinterleave() {
        let buffers = deinterleave(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
        assert_eq!(buffers, vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    }
}
