//! Spectral peak pitch tracker.
//!
//! Frames the waveform with a Hann window, takes the magnitude spectrum of
//! each frame and reports every local spectral peak inside the voice band as
//! a pitch candidate. Peak positions are refined with parabolic interpolation
//! over the neighbouring bins.

use crate::analysis::pitch::{PitchCandidate, PitchFrames, PitchTracker};
use crate::error::{Result, SmartSpeakError};
use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::path::Path;

/// Parameters for [`StftPitchTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StftConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    /// Lowest frequency considered, in Hz.
    pub fmin: f32,
    /// Highest frequency considered, in Hz.
    pub fmax: f32,
    /// Peaks below `threshold * frame maximum` are ignored.
    pub threshold: f32,
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            fmin: 150.0,
            fmax: 4000.0,
            threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StftPitchTracker {
    config: StftConfig,
}

impl StftPitchTracker {
    pub fn new(config: StftConfig) -> Self {
        Self { config }
    }

    /// Track pitch candidates over in-memory samples.
    pub fn track_samples(&self, samples: &[f32], sample_rate: u32) -> PitchFrames {
        let StftConfig {
            n_fft, hop_length, ..
        } = self.config;
        if samples.is_empty() || n_fft < 4 || hop_length == 0 || sample_rate == 0 {
            return PitchFrames::default();
        }

        // Centre frames on their hop position by zero padding both ends
        let pad = n_fft / 2;
        let mut padded = vec![0.0f32; pad];
        padded.extend_from_slice(samples);
        padded.resize(padded.len() + pad, 0.0);

        let n_frames = 1 + (padded.len() - n_fft) / hop_length;
        let window = hann_window(n_fft);
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n_fft);

        let bin_hz = sample_rate as f32 / n_fft as f32;
        let (low_bin, high_bin) = self.band_bins(sample_rate);

        let mut frames = Vec::with_capacity(n_frames);
        let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];
        for frame_idx in 0..n_frames {
            let start = frame_idx * hop_length;
            for (slot, (sample, w)) in buffer
                .iter_mut()
                .zip(padded[start..start + n_fft].iter().zip(&window))
            {
                *slot = Complex::new(sample * w, 0.0);
            }
            fft.process(&mut buffer);

            let spectrum: Vec<f32> = buffer[..=n_fft / 2].iter().map(|c| c.norm()).collect();
            frames.push(self.peaks(&spectrum, low_bin, high_bin, bin_hz));
        }

        PitchFrames::new(frames)
    }

    /// Half-open bin range covering `fmin <= f < fmax`.
    fn band_bins(&self, sample_rate: u32) -> (usize, usize) {
        let n_fft = self.config.n_fft;
        let bin_hz = sample_rate as f32 / n_fft as f32;
        let low_bin = ((self.config.fmin / bin_hz).ceil() as usize).max(1);
        let high_bin = ((self.config.fmax / bin_hz).ceil() as usize).min(n_fft / 2 - 1);
        (low_bin, high_bin)
    }

    fn peaks(
        &self,
        spectrum: &[f32],
        low_bin: usize,
        high_bin: usize,
        bin_hz: f32,
    ) -> Vec<PitchCandidate> {
        let reference = spectrum.iter().copied().fold(0.0f32, f32::max);
        if reference <= 0.0 || low_bin >= high_bin {
            return Vec::new();
        }
        let floor = self.config.threshold * reference;

        (low_bin..high_bin)
            .filter(|&i| {
                spectrum[i] > floor && spectrum[i] > spectrum[i - 1] && spectrum[i] >= spectrum[i + 1]
            })
            .map(|i| {
                let (left, centre, right) = (spectrum[i - 1], spectrum[i], spectrum[i + 1]);
                let avg = 0.5 * (right - left);
                let curvature = 2.0 * centre - left - right;
                let shift = if curvature.abs() > f32::EPSILON {
                    avg / curvature
                } else {
                    0.0
                };
                PitchCandidate::new((i as f32 + shift) * bin_hz, centre + 0.5 * avg * shift)
            })
            .collect()
    }
}

impl PitchTracker for StftPitchTracker {
    fn track(&self, waveform: &Path) -> Result<PitchFrames> {
        let mut reader =
            hound::WavReader::open(waveform).map_err(|e| SmartSpeakError::PitchTracking {
                message: format!("Failed to open {}: {}", waveform.display(), e),
            })?;
        let spec = reader.spec();
        if spec.channels != 1 || spec.bits_per_sample != 16 {
            return Err(SmartSpeakError::PitchTracking {
                message: format!(
                    "Expected 16-bit mono waveform, got {} channel(s) at {} bits",
                    spec.channels, spec.bits_per_sample
                ),
            });
        }
        let samples: Vec<f32> = reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| SmartSpeakError::PitchTracking {
                message: format!("Failed to read waveform samples: {}", e),
            })?;

        Ok(self.track_samples(&samples, spec.sample_rate))
    }
}

fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / n as f32).cos())
        .collect()
}
