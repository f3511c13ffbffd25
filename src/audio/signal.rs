//! Normalized in-memory signal

use ndarray::Array1;
use crate::error::{MoodsetError, Result};

/// Mono amplitude samples at a single sample rate.
///
/// Never empty. Fields are private so a signal cannot change after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    samples: Array1<f32>,
    sample_rate: u32,
}

impl AudioSignal {
    pub fn new(samples: Array1<f32>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(MoodsetError::extraction("Signal must contain at least one sample"));
        }
        if sample_rate == 0 {
            return Err(MoodsetError::extraction("Sample rate must be greater than 0"));
        }
        Ok(Self { samples, sample_rate })
    }

    pub fn from_vec(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(Array1::from(samples), sample_rate)
    }

    pub fn as_slice(&self) -> &[f32] {
        // Array1 built from a Vec is always contiguous
        self.samples.as_slice().unwrap_or(&[])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_creation() {
        let signal = AudioSignal::from_vec(vec![0.0, 0.5, -0.5, 0.25], 22050).unwrap();
        assert_eq!(signal.len(), 4);
        assert_eq!(signal.sample_rate(), 22050);
        assert_eq!(signal.as_slice(), &[0.0, 0.5, -0.5, 0.25]);
        assert!((signal.duration() - 4.0 / 22050.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_signal_rejected() {
        assert!(AudioSignal::from_vec(vec![], 22050).is_err());
        assert!(AudioSignal::from_vec(vec![0.1], 0).is_err());
    }
}
