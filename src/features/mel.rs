//! Mel filterbank and decibel scaling

use ndarray::{Array2, ArrayView2};

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4_f64.ln() / 27.0
}

/// Slaney mel scale: linear below 1 kHz, logarithmic above
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Area-normalised triangular filters over the bins of one FFT frame
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    n_bins: usize,
    filters: Vec<Vec<(usize, f64)>>,
}

impl MelFilterbank {
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize, f_min: f64, f_max: f64) -> Self {
        let n_bins = n_fft / 2 + 1;
        let nyquist = sample_rate as f64 / 2.0;
        let f_max = f_max.min(nyquist).max(f_min);

        let mel_min = hz_to_mel(f_min);
        let mel_max = hz_to_mel(f_max);
        let mel_f: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
            .collect();
        let fft_freqs = super::stft::bin_frequencies(sample_rate, n_fft);

        let filters = (0..n_mels)
            .map(|m| {
                let (left, center, right) = (mel_f[m], mel_f[m + 1], mel_f[m + 2]);
                let enorm = 2.0 / (right - left);
                fft_freqs
                    .iter()
                    .enumerate()
                    .filter_map(|(bin, &f)| {
                        let lower = (f - left) / (center - left);
                        let upper = (right - f) / (right - center);
                        let w = lower.min(upper).max(0.0);
                        (w > 0.0 && w.is_finite()).then_some((bin, w * enorm))
                    })
                    .collect()
            })
            .collect();

        Self { n_bins, filters }
    }

    pub fn n_mels(&self) -> usize {
        self.filters.len()
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Project one power spectrum into `out` (one value per band)
    pub fn apply(&self, power: &[f64], out: &mut [f64]) {
        for (band, filter) in out.iter_mut().zip(&self.filters) {
            *band = filter
                .iter()
                .map(|&(bin, w)| power.get(bin).copied().unwrap_or(0.0) * w)
                .sum();
        }
    }
}

/// `10 * log10(S / ref)` with floor `amin` and dynamic range `top_db` below the maximum
pub fn power_to_db(power: ArrayView2<f64>, reference: f64, amin: f64, top_db: Option<f64>) -> Array2<f64> {
    let ref_db = 10.0 * reference.abs().max(amin).log10();
    let mut db = power.mapv(|p| 10.0 * p.max(amin).log10() - ref_db);
    if let Some(top_db) = top_db {
        let peak = db.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let floor = peak - top_db;
        db.mapv_inplace(|v| v.max(floor));
    }
    db
}

/// Treat `values` as amplitudes and convert to dB relative to their own peak
pub fn amplitude_to_db_peak(values: ArrayView2<f64>, top_db: f64) -> Array2<f64> {
    let peak = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let power = values.mapv(|v| v * v);
    power_to_db(power.view(), peak * peak, 1e-10, Some(top_db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mel_scale_roundtrip() {
        for hz in [0.0, 100.0, 999.0, 1000.0, 4000.0, 11025.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_filterbank_shape() {
        let bank = MelFilterbank::new(22050, 2048, 128, 0.0, 11025.0);
        assert_eq!(bank.n_mels(), 128);
        assert_eq!(bank.n_bins(), 1025);
        let power = vec![1.0; 1025];
        let mut out = vec![0.0; 128];
        bank.apply(&power, &mut out);
        assert!(out.iter().all(|v| v.is_finite() && *v >= 0.0));
        assert!(out.iter().any(|v| *v > 0.0));
    }

    #[test]
    fn test_filter_peaks_near_band_centre() {
        let bank = MelFilterbank::new(22050, 2048, 40, 0.0, 11025.0);
        let mut power = vec![0.0; 1025];
        power[200] = 1.0; // ~2153 Hz
        let mut out = vec![0.0; 40];
        bank.apply(&power, &mut out);
        let hot = out.iter().filter(|v| **v > 0.0).count();
        assert!(hot >= 1 && hot <= 2);
    }

    #[test]
    fn test_power_to_db() {
        let p = array![[1.0, 0.1], [0.01, 0.0]];
        let db = power_to_db(p.view(), 1.0, 1e-10, Some(80.0));
        assert!((db[[0, 0]] - 0.0).abs() < 1e-9);
        assert!((db[[0, 1]] + 10.0).abs() < 1e-9);
        assert!((db[[1, 0]] + 20.0).abs() < 1e-9);
        assert!((db[[1, 1]] + 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_amplitude_to_db_peak_relative() {
        let v = array![[2.0, 0.2]];
        let db = amplitude_to_db_peak(v.view(), 80.0);
        assert!(db[[0, 0]].abs() < 1e-9);
        assert!((db[[0, 1]] + 20.0).abs() < 1e-9);

        let silent = Array2::<f64>::zeros((3, 4));
        let db = amplitude_to_db_peak(silent.view(), 80.0);
        assert!(db.iter().all(|v| *v == 0.0));
    }
}
