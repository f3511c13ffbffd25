//! Feature Extraction
//!
//! Summarises a whole [`AudioSignal`] as five scalars: global tempo, mean RMS,
//! mean spectral centroid, and the mean / standard deviation of the
//! peak-relative dB mel spectrogram. Every value in a returned
//! [`FeatureVector`] is finite.

pub mod energy;
pub mod mel;
pub mod rhythm;
pub mod spectral;
pub mod stft;

use ndarray::Array2;
use crate::audio::AudioSignal;
use crate::config::AnalysisConfig;
use crate::error::{MoodsetError, Result};
use mel::{amplitude_to_db_peak, MelFilterbank};
use rhythm::{BeatTrack, TempoParams};
use stft::Stft;

/// Column order of every dataset
pub const FEATURE_NAMES: [&str; 5] = [
    "tempo",
    "rms_mean",
    "spectral_centroid_mean",
    "mel_spec_mean",
    "mel_spec_std",
];

/// Dynamic range kept below the mel spectrogram peak
const MEL_TOP_DB: f64 = 80.0;

/// Fixed-schema descriptors of one recording, optionally labeled
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub tempo: f64,
    pub rms_mean: f64,
    pub spectral_centroid_mean: f64,
    pub mel_spec_mean: f64,
    pub mel_spec_std: f64,
    label: Option<String>,
}

impl FeatureVector {
    /// Build from values in [`FEATURE_NAMES`] order
    pub fn from_values(values: [f64; 5]) -> Self {
        let [tempo, rms_mean, spectral_centroid_mean, mel_spec_mean, mel_spec_std] = values;
        Self { tempo, rms_mean, spectral_centroid_mean, mel_spec_mean, mel_spec_std, label: None }
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn values(&self) -> [f64; 5] {
        [self.tempo, self.rms_mean, self.spectral_centroid_mean, self.mel_spec_mean, self.mel_spec_std]
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES.iter().position(|n| *n == name).map(|i| self.values()[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values())
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Every value must be finite
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.iter() {
            if !value.is_finite() {
                return Err(MoodsetError::extraction(format!("Feature {} is not finite: {}", name, value)));
            }
        }
        Ok(())
    }
}

/// Features plus the beat positions found on the way
#[derive(Debug, Clone)]
pub struct SignalAnalysis {
    pub features: FeatureVector,
    pub beats: BeatTrack,
}

/// Stateless extractor; safe to share across worker threads
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    frame_length: usize,
    hop_length: usize,
    n_mels: usize,
    tempo: TempoParams,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl FeatureExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            frame_length: config.frame_length,
            hop_length: config.hop_length.max(1),
            n_mels: config.n_mels,
            tempo: TempoParams {
                start_bpm: config.start_bpm,
                max_tempo: config.max_tempo,
                tightness: config.tightness,
                ..TempoParams::default()
            },
        }
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Unlabeled feature vector for `signal`
    pub fn extract(&self, signal: &AudioSignal) -> Result<FeatureVector> {
        Ok(self.analyze(signal)?.features)
    }

    pub fn analyze(&self, signal: &AudioSignal) -> Result<SignalAnalysis> {
        let samples = signal.as_slice();
        if samples.is_empty() {
            return Err(MoodsetError::extraction("Signal has no samples"));
        }
        let sr = signal.sample_rate();

        let rms_mean = energy::rms_mean(samples, self.frame_length, self.hop_length);

        // One STFT pass feeds the centroid and the mel power spectrogram
        let stft = Stft::new(self.frame_length, self.hop_length);
        let bank = MelFilterbank::new(sr, self.frame_length, self.n_mels, 0.0, sr as f64 / 2.0);
        let freqs = stft::bin_frequencies(sr, self.frame_length);
        let n_frames = stft.frame_count(samples.len());

        let mut mel_power = Array2::<f64>::zeros((self.n_mels, n_frames));
        let mut centroids = Vec::with_capacity(n_frames);
        let mut power = vec![0.0; stft.n_bins()];
        let mut bands = vec![0.0; self.n_mels];

        stft.for_each_magnitude(samples, |frame, magnitudes| {
            centroids.push(spectral::centroid(magnitudes, &freqs));
            for (p, m) in power.iter_mut().zip(magnitudes) {
                *p = m * m;
            }
            bank.apply(&power, &mut bands);
            mel_power.column_mut(frame).assign(&ndarray::ArrayView1::from(&bands[..]));
        });

        let spectral_centroid_mean = mean(&centroids);

        let mel_db = amplitude_to_db_peak(mel_power.view(), MEL_TOP_DB);
        let mel_spec_mean = mel_db.mean().unwrap_or(0.0);
        let mel_spec_std = mel_db.std(0.0);

        let onset = rhythm::onset_strength(mel_power.view(), self.frame_length, self.hop_length);
        let frame_rate = sr as f64 / self.hop_length as f64;
        let beats = rhythm::beat_track(&onset, frame_rate, &self.tempo);

        let features = FeatureVector::from_values([
            beats.tempo,
            rms_mean,
            spectral_centroid_mean,
            mel_spec_mean,
            mel_spec_std,
        ]);
        features.validate()?;

        log::debug!(
            "Extracted {} frames: tempo={:.2} rms={:.4} centroid={:.1} mel={:.2}±{:.2}",
            n_frames, features.tempo, features.rms_mean, features.spectral_centroid_mean,
            features.mel_spec_mean, features.mel_spec_std
        );

        Ok(SignalAnalysis { features, beats })
    }
}

/// Arithmetic mean, 0.0 for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use std::f32::consts::PI;

    const SR: u32 = 22050;

    fn sine(freq: f32, seconds: f32, amplitude: f32) -> AudioSignal {
        let n = (seconds * SR as f32) as usize;
        let samples = (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SR as f32).sin())
            .collect();
        AudioSignal::from_vec(samples, SR).unwrap()
    }

    fn assert_all_finite(fv: &FeatureVector) {
        for (name, v) in fv.iter() {
            assert!(v.is_finite(), "{} = {}", name, v);
        }
    }

    #[test]
    fn test_feature_names_match_values() {
        let fv = FeatureVector::from_values([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(fv.get("tempo"), Some(1.0));
        assert_eq!(fv.get("mel_spec_std"), Some(5.0));
        assert_eq!(fv.get("label"), None);
        assert_eq!(fv.iter().count(), FEATURE_NAMES.len());
        assert!(fv.label().is_none());
        assert_eq!(fv.with_label("calm").label(), Some("calm"));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let fv = FeatureVector::from_values([f64::NAN, 0.0, 0.0, 0.0, 0.0]);
        assert!(matches!(fv.validate(), Err(MoodsetError::Extraction { .. })));
    }

    #[test]
    fn test_silent_signal() {
        let signal = AudioSignal::from_vec(vec![0.0; SR as usize], SR).unwrap();
        let fv = FeatureExtractor::default().extract(&signal).unwrap();
        assert_eq!(fv.rms_mean, 0.0);
        assert_eq!(fv.spectral_centroid_mean, 0.0);
        assert_eq!(fv.tempo, 0.0);
        assert_eq!(fv.mel_spec_mean, 0.0);
        assert_eq!(fv.mel_spec_std, 0.0);
    }

    #[test]
    fn test_sub_frame_signal() {
        let signal = AudioSignal::from_vec(vec![0.3, -0.2, 0.1], SR).unwrap();
        let fv = FeatureExtractor::default().extract(&signal).unwrap();
        assert_all_finite(&fv);
        assert!(fv.rms_mean > 0.0);
    }

    #[test]
    fn test_single_sample_signal() {
        let signal = AudioSignal::from_vec(vec![1.0], SR).unwrap();
        let fv = FeatureExtractor::default().extract(&signal).unwrap();
        assert_all_finite(&fv);
    }

    #[test]
    fn test_sine_centroid_and_rms() {
        let fv = FeatureExtractor::default().extract(&sine(1000.0, 2.0, 0.5)).unwrap();
        assert_all_finite(&fv);
        // RMS of a sine is A/sqrt(2); edge frames are half padding
        assert!(fv.rms_mean > 0.3 && fv.rms_mean < 0.36, "rms {}", fv.rms_mean);
        assert!((fv.spectral_centroid_mean - 1000.0).abs() < 250.0, "centroid {}", fv.spectral_centroid_mean);
        assert!(fv.mel_spec_mean < 0.0);
        assert!(fv.mel_spec_std > 0.0);
    }

    #[test]
    fn test_brighter_signal_has_higher_centroid() {
        let extractor = FeatureExtractor::default();
        let low = extractor.extract(&sine(300.0, 1.0, 0.5)).unwrap();
        let high = extractor.extract(&sine(4000.0, 1.0, 0.5)).unwrap();
        assert!(high.spectral_centroid_mean > low.spectral_centroid_mean);
    }

    #[test]
    fn test_click_track_tempo() {
        // 120 BPM clicks: a short noise burst every 0.5 s
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut samples = vec![0.0f32; SR as usize * 12];
        let step = SR as usize / 2;
        for start in (0..samples.len()).step_by(step) {
            for s in samples.iter_mut().skip(start).take(400) {
                *s = rng.gen_range(-0.8..0.8);
            }
        }
        let signal = AudioSignal::from_vec(samples, SR).unwrap();
        let analysis = FeatureExtractor::default().analyze(&signal).unwrap();
        let tempo = analysis.features.tempo;
        assert!((tempo - 120.0).abs() < 6.0, "tempo {}", tempo);
        assert!(analysis.beats.beat_times.len() >= 10);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let samples: Vec<f32> = (0..SR as usize * 3).map(|_| rng.gen_range(-0.5..0.5)).collect();
        let signal = AudioSignal::from_vec(samples, SR).unwrap();
        let extractor = FeatureExtractor::default();
        let a = extractor.extract(&signal).unwrap();
        let b = extractor.extract(&signal).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mean_helper() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
