//! Centred framing and short-time magnitude spectra

use std::f64::consts::PI;
use std::sync::Arc;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Periodic Hann window
pub fn hann_window(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / len as f64).cos())
        .collect()
}

/// Number of centred frames: the signal is padded by `frame_length / 2` on both sides.
pub fn frame_count(len: usize, hop: usize) -> usize {
    1 + len / hop.max(1)
}

/// Sample at `index` of the centred frame `frame`, zero outside the signal.
#[inline]
pub fn centred_sample(samples: &[f32], frame: usize, hop: usize, frame_length: usize, offset: usize) -> f64 {
    let padded = frame * hop + offset;
    let half = frame_length / 2;
    if padded < half {
        return 0.0;
    }
    samples.get(padded - half).map(|&s| s as f64).unwrap_or(0.0)
}

/// Bin centre frequencies `k * sr / n_fft` for `k in 0..=n_fft/2`
pub fn bin_frequencies(sample_rate: u32, n_fft: usize) -> Vec<f64> {
    (0..=n_fft / 2)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect()
}

/// Short-time Fourier transform with a periodic Hann window
pub struct Stft {
    n_fft: usize,
    hop: usize,
    window: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
}

impl Stft {
    pub fn new(n_fft: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            n_fft,
            hop: hop.max(1),
            window: hann_window(n_fft),
            fft: planner.plan_fft_forward(n_fft),
        }
    }

    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    pub fn frame_count(&self, len: usize) -> usize {
        frame_count(len, self.hop)
    }

    /// Call `visit(frame_index, magnitudes)` for every centred frame in order.
    pub fn for_each_magnitude<F>(&self, samples: &[f32], mut visit: F)
    where
        F: FnMut(usize, &[f64]),
    {
        let n_bins = self.n_bins();
        let mut buffer = vec![Complex::<f64>::new(0.0, 0.0); self.n_fft];
        let mut scratch = vec![Complex::<f64>::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        let mut magnitudes = vec![0.0; n_bins];

        for frame in 0..self.frame_count(samples.len()) {
            for (i, cell) in buffer.iter_mut().enumerate() {
                let x = centred_sample(samples, frame, self.hop, self.n_fft, i);
                *cell = Complex::new(x * self.window[i], 0.0);
            }
            self.fft.process_with_scratch(&mut buffer, &mut scratch);
            for (m, c) in magnitudes.iter_mut().zip(buffer.iter()) {
                *m = c.norm();
            }
            visit(frame, &magnitudes);
        }
    }
}
