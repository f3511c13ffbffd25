//! Audio Format Converter - down-mix and sample-rate conversion

use ndarray::{Array1, ArrayView1};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use crate::audio::wav::DecodedAudio;
use crate::error::{MoodsetError, Result};

/// Taps of the interpolation filter
const SINC_LEN: usize = 256;

pub struct AudioConverter;

impl AudioConverter {
    /// Down-mix to mono and resample to `target_sample_rate`
    pub fn to_mono_at_rate(audio: &DecodedAudio, target_sample_rate: u32) -> Result<Array1<f32>> {
        let mono = audio.data.to_mono();
        Self::convert_sample_rate(mono.view(), audio.sample_rate, target_sample_rate)
    }

    /// Convert sample rate with band-limited sinc interpolation.
    ///
    /// Output has `max(1, len * target / source)` samples, aligned with the input.
    pub fn convert_sample_rate(data: ArrayView1<f32>, source_rate: u32, target_rate: u32) -> Result<Array1<f32>> {
        if data.is_empty() {
            return Err(MoodsetError::extraction("Input data is empty"));
        }
        if source_rate == 0 || target_rate == 0 {
            return Err(MoodsetError::extraction("Sample rates must be greater than 0"));
        }
        if source_rate == target_rate {
            return Ok(data.to_owned());
        }

        let ratio = target_rate as f64 / source_rate as f64;
        let new_length = ((data.len() as f64 * ratio) as usize).max(1);
        let resampled = Self::resample_mono(data, new_length, ratio)?;

        log::debug!(
            "Resampled {} samples ({} Hz) -> {} samples ({} Hz)",
            data.len(), source_rate, resampled.len(), target_rate
        );
        Ok(resampled)
    }

    fn resample_mono(data: ArrayView1<f32>, new_length: usize, ratio: f64) -> Result<Array1<f32>> {
        let params = SincInterpolationParameters {
            sinc_len: SINC_LEN,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        // Trailing zeros flush the filter tail in a single pass
        let mut input = Vec::with_capacity(data.len() + SINC_LEN);
        input.extend(data.iter().copied());
        input.resize(data.len() + SINC_LEN, 0.0);

        let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input.len(), 1)
            .map_err(|e| MoodsetError::extraction(format!("Failed to create resampler: {}", e)))?;
        let input_channels = vec![input];
        let mut output = resampler
            .process(&input_channels, None)
            .map_err(|e| MoodsetError::extraction(format!("Resampling failed: {}", e)))?;

        let channel = output.pop().unwrap_or_default();
        // The filter delays the output by half its length
        let delay = ((SINC_LEN as f64 * ratio / 2.0) as usize).min(channel.len());
        let mut samples: Vec<f32> = channel[delay..].iter().copied().take(new_length).collect();
        samples.resize(new_length, 0.0);
        Ok(Array1::from(samples))
    }
}
