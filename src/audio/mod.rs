//! Audio decoding and normalization.

pub mod wav;

pub use wav::{AudioNormalizer, NormalizedAudio, WavNormalizer};
