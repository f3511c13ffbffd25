//! Frame-wise RMS energy

use super::stft::{centred_sample, frame_count};

/// RMS of each centred, un-windowed frame
pub fn frame_rms(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f64> {
    let frame_length = frame_length.max(1);
    (0..frame_count(samples.len(), hop))
        .map(|frame| {
            let sum_sq: f64 = (0..frame_length)
                .map(|i| {
                    let x = centred_sample(samples, frame, hop, frame_length, i);
                    x * x
                })
                .sum();
            (sum_sq / frame_length as f64).sqrt()
        })
        .collect()
}

pub fn rms_mean(samples: &[f32], frame_length: usize, hop: usize) -> f64 {
    super::mean(&frame_rms(samples, frame_length, hop))
}
