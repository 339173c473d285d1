//! WAV decoding and normalization to the canonical analysis waveform.

use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, SmartSpeakError};
use std::io::Cursor;
use std::path::Path;

/// Mono 16-bit PCM waveform at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl NormalizedAudio {
    /// Length of the waveform in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Write the waveform as a 16-bit mono WAV file, replacing any existing content.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer =
            hound::WavWriter::create(path, spec).map_err(|e| SmartSpeakError::AudioEncode {
                message: format!("Failed to create WAV file: {}", e),
            })?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .map_err(|e| SmartSpeakError::AudioEncode {
                    message: format!("Failed to write WAV sample: {}", e),
                })?;
        }
        writer.finalize().map_err(|e| SmartSpeakError::AudioEncode {
            message: format!("Failed to finalize WAV file: {}", e),
        })
    }
}

/// Turns an uploaded clip into the canonical waveform.
pub trait AudioNormalizer: Send + Sync {
    /// Decode raw file bytes into mono audio at [`SAMPLE_RATE`].
    fn normalize(&self, raw: &[u8]) -> Result<NormalizedAudio>;
}

/// Normalizer for RIFF/WAVE input of any channel count, rate and common bit depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavNormalizer;

impl AudioNormalizer for WavNormalizer {
    fn normalize(&self, raw: &[u8]) -> Result<NormalizedAudio> {
        let mut reader =
            hound::WavReader::new(Cursor::new(raw)).map_err(|e| SmartSpeakError::AudioDecode {
                message: format!("Failed to parse WAV file: {}", e),
            })?;

        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(SmartSpeakError::AudioDecode {
                message: "WAV file declares zero channels".to_string(),
            });
        }

        let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(read_error)?,
            (hound::SampleFormat::Int, bits @ (8 | 24 | 32)) => {
                let shift = i32::from(bits) - 16;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| scale_int(v, shift)))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(read_error)?
            }
            (hound::SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(read_error)?,
            (format, bits) => {
                return Err(SmartSpeakError::AudioDecode {
                    message: format!("Unsupported WAV sample format: {:?} {}-bit", format, bits),
                });
            }
        };

        let mono = downmix(&interleaved, spec.channels);
        let samples = resample(&mono, spec.sample_rate, SAMPLE_RATE);

        Ok(NormalizedAudio {
            samples,
            sample_rate: SAMPLE_RATE,
        })
    }
}

fn read_error(e: hound::Error) -> SmartSpeakError {
    SmartSpeakError::AudioDecode {
        message: format!("Failed to read WAV samples: {}", e),
    }
}

/// Bring an integer sample of arbitrary width to 16 bits.
///
/// `shift` is the source bit depth minus 16; 8-bit input arrives signed from hound.
fn scale_int(value: i32, shift: i32) -> i16 {
    if shift < 0 {
        (value << -shift) as i16
    } else {
        (value >> shift) as i16
    }
}

/// Average interleaved frames down to a single channel.
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
