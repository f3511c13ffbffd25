//! Fixed-length segment profile
//!
//! Splits a signal into consecutive segments and reports mean energy and
//! spectral brightness per segment. A trailing partial segment is profiled
//! as long as it spans at least one analysis frame.

use std::fmt;

use crate::audio::AudioSignal;
use crate::config::AnalysisConfig;
use crate::error::{MoodsetError, Result};
use crate::features::{energy, spectral};

pub const DEFAULT_SEGMENT_SECONDS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyLevel {
    High,
    Medium,
    Low,
}

impl EnergyLevel {
    pub fn classify(rms: f64) -> Self {
        if rms > 0.1 {
            Self::High
        } else if rms > 0.05 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brightness {
    Bright,
    Medium,
    Dark,
}

impl Brightness {
    pub fn classify(centroid_hz: f64) -> Self {
        if centroid_hz > 2000.0 {
            Self::Bright
        } else if centroid_hz > 1000.0 {
            Self::Medium
        } else {
            Self::Dark
        }
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bright => "bright",
            Self::Medium => "medium",
            Self::Dark => "dark",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentProfile {
    /// Position among all segments, counting skipped ones
    pub index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub rms_mean: f64,
    pub centroid_mean: f64,
    pub energy: EnergyLevel,
    pub brightness: Brightness,
}

#[derive(Debug, Clone)]
pub struct SegmentAnalyzer {
    segment_seconds: f64,
    frame_length: usize,
    hop_length: usize,
}

impl SegmentAnalyzer {
    pub fn new(segment_seconds: f64, config: &AnalysisConfig) -> Result<Self> {
        if !(segment_seconds > 0.0 && segment_seconds.is_finite()) {
            return Err(MoodsetError::config(format!(
                "Segment length must be a positive number of seconds, got {}", segment_seconds
            )));
        }
        Ok(Self {
            segment_seconds,
            frame_length: config.frame_length,
            hop_length: config.hop_length.max(1),
        })
    }

    pub fn segment_seconds(&self) -> f64 {
        self.segment_seconds
    }

    pub fn analyze(&self, signal: &AudioSignal) -> Vec<SegmentProfile> {
        let sr = signal.sample_rate();
        let samples = signal.as_slice();
        let step = ((self.segment_seconds * sr as f64).round() as usize).max(1);

        let mut profiles = Vec::new();
        for (index, start) in (0..samples.len()).step_by(step).enumerate() {
            let end = (start + step).min(samples.len());
            let segment = &samples[start..end];
            if segment.len() < self.frame_length {
                log::debug!("Segment {} has {} samples, shorter than one frame; skipped", index + 1, segment.len());
                continue;
            }

            let rms_mean = energy::rms_mean(segment, self.frame_length, self.hop_length);
            let centroid_mean = spectral::centroid_mean(segment, sr, self.frame_length, self.hop_length);
            profiles.push(SegmentProfile {
                index,
                start_secs: start as f64 / sr as f64,
                end_secs: end as f64 / sr as f64,
                rms_mean,
                centroid_mean,
                energy: EnergyLevel::classify(rms_mean),
                brightness: Brightness::classify(centroid_mean),
            });
        }
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 22050;

    fn tone(freq: f32, amplitude: f32, seconds: f32) -> Vec<f32> {
        let n = (seconds * SR as f32) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / SR as f32).sin())
            .collect()
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(EnergyLevel::classify(0.2), EnergyLevel::High);
        assert_eq!(EnergyLevel::classify(0.1), EnergyLevel::Medium);
        assert_eq!(EnergyLevel::classify(0.05), EnergyLevel::Low);
        assert_eq!(Brightness::classify(2500.0), Brightness::Bright);
        assert_eq!(Brightness::classify(2000.0), Brightness::Medium);
        assert_eq!(Brightness::classify(1000.0), Brightness::Dark);
        assert_eq!(EnergyLevel::High.to_string(), "high");
        assert_eq!(Brightness::Dark.to_string(), "dark");
    }

    #[test]
    fn test_segments_cover_signal() {
        let mut samples = tone(3000.0, 0.5, 1.0);
        samples.extend(tone(1500.0, 0.1, 1.0));
        samples.extend(tone(300.0, 0.02, 0.5));
        let signal = AudioSignal::from_vec(samples, SR).unwrap();

        let analyzer = SegmentAnalyzer::new(1.0, &AnalysisConfig::default()).unwrap();
        let profiles = analyzer.analyze(&signal);
        assert_eq!(profiles.len(), 3);

        assert_eq!(profiles[0].energy, EnergyLevel::High);
        assert_eq!(profiles[0].brightness, Brightness::Bright);
        assert_eq!(profiles[1].energy, EnergyLevel::Medium);
        assert_eq!(profiles[1].brightness, Brightness::Medium);
        assert_eq!(profiles[2].energy, EnergyLevel::Low);
        assert_eq!(profiles[2].brightness, Brightness::Dark);

        assert!((profiles[2].start_secs - 2.0).abs() < 1e-9);
        assert!((profiles[2].end_secs - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_short_tail_is_skipped() {
        // 1 s plus 1000 samples: the tail is shorter than a 2048-sample frame
        let samples = tone(440.0, 0.3, 1.0 + 1000.0 / SR as f32);
        let signal = AudioSignal::from_vec(samples, SR).unwrap();
        let profiles = SegmentAnalyzer::new(1.0, &AnalysisConfig::default()).unwrap().analyze(&signal);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].index, 0);
    }

    #[test]
    fn test_invalid_segment_length() {
        let config = AnalysisConfig::default();
        assert!(SegmentAnalyzer::new(0.0, &config).is_err());
        assert!(SegmentAnalyzer::new(f64::NAN, &config).is_err());
        assert!(SegmentAnalyzer::new(DEFAULT_SEGMENT_SECONDS, &config).is_ok());
    }
}
