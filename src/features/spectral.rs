//! Spectral centroid

use super::stft::{bin_frequencies, Stft};

/// Magnitude-weighted mean frequency of one frame.
///
/// A frame with no energy has centroid 0.0.
pub fn centroid(magnitudes: &[f64], frequencies: &[f64]) -> f64 {
    let (weighted, total) = magnitudes
        .iter()
        .zip(frequencies)
        .fold((0.0, 0.0), |(w, t), (&m, &f)| (w + m * f, t + m));
    if total > 0.0 && total.is_finite() {
        weighted / total
    } else {
        0.0
    }
}

/// Mean centroid over the centred frames of `samples`
pub fn centroid_mean(samples: &[f32], sample_rate: u32, n_fft: usize, hop: usize) -> f64 {
    let stft = Stft::new(n_fft, hop);
    let freqs = bin_frequencies(sample_rate, n_fft);
    let mut centroids = Vec::with_capacity(stft.frame_count(samples.len()));
    stft.for_each_magnitude(samples, |_, magnitudes| centroids.push(centroid(magnitudes, &freqs)));
    super::mean(&centroids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_bin() {
        let freqs = [0.0, 100.0, 200.0, 300.0];
        assert_eq!(centroid(&[0.0, 0.0, 3.0, 0.0], &freqs), 200.0);
    }

    #[test]
    fn test_weighted_average() {
        let freqs = [0.0, 100.0, 200.0, 300.0];
        assert!((centroid(&[0.0, 1.0, 0.0, 1.0], &freqs) - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_silent_frame_falls_back_to_zero() {
        let freqs = [0.0, 100.0, 200.0];
        assert_eq!(centroid(&[0.0, 0.0, 0.0], &freqs), 0.0);
        assert_eq!(centroid_mean(&[0.0; 4096], 22050, 2048, 512), 0.0);
    }

    #[test]
    fn test_sine_centroid_mean() {
        let samples: Vec<f32> = (0..22050)
            .map(|i| (2.0 * std::f32::consts::PI * 2000.0 * i as f32 / 22050.0).sin())
            .collect();
        let c = centroid_mean(&samples, 22050, 2048, 512);
        assert!((c - 2000.0).abs() < 250.0, "centroid {}", c);
    }
}
