//! Pitch modulation: how much the speaker's fundamental frequency varies.

use crate::error::{Result, SmartSpeakError};
use std::path::Path;
use std::sync::Arc;

/// One fundamental-frequency candidate in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchCandidate {
    /// Frequency in Hz; non-positive or NaN means unvoiced.
    pub frequency: f32,
    pub magnitude: f32,
}

impl PitchCandidate {
    pub fn new(frequency: f32, magnitude: f32) -> Self {
        Self {
            frequency,
            magnitude,
        }
    }
}

/// Candidate tracks per time frame, as produced by a pitch tracker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchFrames {
    pub frames: Vec<Vec<PitchCandidate>>,
}

impl PitchFrames {
    pub fn new(frames: Vec<Vec<PitchCandidate>>) -> Self {
        Self { frames }
    }

    /// The strongest candidate of each frame, kept only when its frequency is positive.
    pub fn retained_pitches(&self) -> Vec<f64> {
        self.frames
            .iter()
            .filter_map(|frame| strongest(frame))
            .map(|candidate| candidate.frequency)
            .filter(|&frequency| frequency > 0.0)
            .map(f64::from)
            .collect()
    }

    /// Population standard deviation of the retained pitches.
    ///
    /// Returns `0.0` when fewer than two pitches survive.
    pub fn modulation(&self) -> f64 {
        population_std_dev(&self.retained_pitches())
    }
}

/// Highest-magnitude candidate; the earliest one wins ties.
fn strongest(frame: &[PitchCandidate]) -> Option<&PitchCandidate> {
    let mut best: Option<&PitchCandidate> = None;
    for candidate in frame {
        match best {
            Some(current) if !(candidate.magnitude > current.magnitude) => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Population standard deviation; `0.0` for fewer than two values.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Extracts per-frame pitch candidates from a canonical waveform file.
pub trait PitchTracker: Send + Sync {
    fn track(&self, waveform: &Path) -> Result<PitchFrames>;
}

impl<T: PitchTracker> PitchTracker for Arc<T> {
    fn track(&self, waveform: &Path) -> Result<PitchFrames> {
        (**self).track(waveform)
    }
}

/// Run the tracker and reduce to a modulation value, degrading to `0.0` on failure.
pub fn modulation_or_default(tracker: &dyn PitchTracker, waveform: &Path) -> f64 {
    match tracker.track(waveform) {
        Ok(frames) => frames.modulation(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not analyze pitch");
            0.0
        }
    }
}

/// Mock pitch tracker for testing
#[derive(Debug, Clone, Default)]
pub struct MockPitchTracker {
    frames: PitchFrames,
    should_fail: bool,
}

impl MockPitchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return one single-candidate frame per frequency, all with equal magnitude.
    pub fn with_pitches(mut self, pitches: &[f32]) -> Self {
        self.frames = PitchFrames::new(
            pitches
                .iter()
                .map(|&f| vec![PitchCandidate::new(f, 1.0)])
                .collect(),
        );
        self
    }

    pub fn with_frames(mut self, frames: PitchFrames) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl PitchTracker for MockPitchTracker {
    fn track(&self, _waveform: &Path) -> Result<PitchFrames> {
        if self.should_fail {
            return Err(SmartSpeakError::PitchTracking {
                message: "mock pitch failure".to_string(),
            });
        }
        Ok(self.frames.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strongest_candidate_is_selected_per_frame() {
        let frames = PitchFrames::new(vec![
            vec![
                PitchCandidate::new(100.0, 0.2),
                PitchCandidate::new(200.0, 0.9),
                PitchCandidate::new(300.0, 0.5),
            ],
            vec![PitchCandidate::new(150.0, 0.4), PitchCandidate::new(250.0, 0.1)],
        ]);
        assert_eq!(frames.retained_pitches(), vec![200.0, 150.0]);
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let frames = PitchFrames::new(vec![vec![
            PitchCandidate::new(110.0, 0.5),
            PitchCandidate::new(220.0, 0.5),
        ]]);
        assert_eq!(frames.retained_pitches(), vec![110.0]);
    }

    #[test]
    fn unvoiced_frames_are_discarded() {
        let frames = PitchFrames::new(vec![
            vec![PitchCandidate::new(0.0, 1.0), PitchCandidate::new(180.0, 0.5)],
            vec![PitchCandidate::new(-5.0, 1.0)],
            vec![PitchCandidate::new(f32::NAN, 1.0)],
            vec![],
            vec![PitchCandidate::new(120.0, 0.3)],
        ]);
        // The loudest candidate of the first frame is unvoiced, so the frame contributes nothing
        assert_eq!(frames.retained_pitches(), vec![120.0]);
    }

    #[test]
    fn modulation_needs_two_values() {
        assert_eq!(PitchFrames::default().modulation(), 0.0);
        let single = PitchFrames::new(vec![vec![PitchCandidate::new(220.0, 1.0)]]);
        assert_eq!(single.modulation(), 0.0);
    }

    #[test]
    fn modulation_is_population_std_dev() {
        let tracker = MockPitchTracker::new().with_pitches(&[100.0, 200.0, 300.0, 0.0]);
        let frames = tracker.track(Path::new("unused.wav")).unwrap();
        // mean 200, deviations 100/0/100 -> sqrt(20000/3)
        let expected = (20000.0f64 / 3.0).sqrt();
        assert!((frames.modulation() - expected).abs() < 1e-6);
    }

    #[test]
    fn population_std_dev_of_identical_values_is_zero() {
        assert_eq!(population_std_dev(&[150.0, 150.0, 150.0]), 0.0);
        assert!((population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn tracker_failure_degrades_to_zero() {
        let tracker = MockPitchTracker::new().with_failure();
        assert_eq!(modulation_or_default(&tracker, Path::new("missing.wav")), 0.0);
    }

    #[test]
    fn tracker_success_reports_modulation() {
        let tracker = MockPitchTracker::new().with_pitches(&[100.0, 140.0]);
        assert!((modulation_or_default(&tracker, Path::new("x.wav")) - 20.0).abs() < 1e-6);
    }
}
