//! WAV audio file reading

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use hound::{SampleFormat, WavReader};
use ndarray::{Array1, Array2, Axis};
use crate::error::{MoodsetError, Result};

/// Raw decoded PCM before down-mixing
#[derive(Debug, Clone)]
pub enum AudioData {
    Mono(Array1<f32>),
    /// frames x channels
    Multi(Array2<f32>),
}

impl AudioData {
    /// Build from interleaved samples. A trailing partial frame is dropped.
    pub fn from_interleaved(samples: Vec<f32>, channels: usize) -> Result<Self> {
        match channels {
            0 => Err(MoodsetError::extraction("Channel count cannot be 0")),
            1 => Ok(AudioData::Mono(Array1::from(samples))),
            n => {
                let frames = samples.len() / n;
                let mut samples = samples;
                samples.truncate(frames * n);
                let data = Array2::from_shape_vec((frames, n), samples)
                    .map_err(|e| MoodsetError::extraction(format!("Bad channel layout: {}", e)))?;
                Ok(AudioData::Multi(data))
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AudioData::Mono(data) => data.len(),
            AudioData::Multi(data) => data.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channels(&self) -> usize {
        match self {
            AudioData::Mono(_) => 1,
            AudioData::Multi(data) => data.ncols(),
        }
    }

    /// Average all channels into one
    pub fn to_mono(&self) -> Array1<f32> {
        match self {
            AudioData::Mono(data) => data.clone(),
            AudioData::Multi(data) => data
                .mean_axis(Axis(1))
                .unwrap_or_else(|| Array1::zeros(0)),
        }
    }
}

/// PCM straight out of a container, at its native rate and channel count
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub data: AudioData,
}

impl DecodedAudio {
    pub fn channels(&self) -> usize {
        self.data.channels()
    }

    pub fn frames(&self) -> usize {
        self.data.len()
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Read a RIFF/WAVE file into normalized f32 PCM.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<DecodedAudio> {
    let path = path.as_ref();

    let file = File::open(path)
        .map_err(|e| MoodsetError::decode(path, format!("Cannot open audio file: {}", e)))?;

    let reader = WavReader::new(BufReader::new(file))
        .map_err(|e| MoodsetError::decode(path, format!("Cannot create WAV reader: {}", e)))?;

    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(MoodsetError::decode(path, "Invalid sample rate"));
    }
    if spec.channels == 0 {
        return Err(MoodsetError::decode(path, "Invalid channel count"));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => read_samples::<f32, _>(reader, path, 1.0)?,
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = (1i64 << (bits - 1)) as f32;
            read_samples::<i32, _>(reader, path, scale)?
        }
        (format, bits) => {
            return Err(MoodsetError::decode(
                path,
                format!("Unsupported WAV sample format: {:?} {}-bit", format, bits),
            ));
        }
    };

    if samples.is_empty() {
        return Err(MoodsetError::decode(path, "WAV file contains no samples"));
    }

    let data = AudioData::from_interleaved(samples, spec.channels as usize)
        .map_err(|e| MoodsetError::decode(path, e.to_string()))?;

    log::debug!(
        "WAV {}: {} Hz, {} ch, {}-bit, {} frames",
        path.display(), spec.sample_rate, spec.channels, spec.bits_per_sample, data.len()
    );

    Ok(DecodedAudio { sample_rate: spec.sample_rate, data })
}

fn read_samples<S, R>(mut reader: WavReader<R>, path: &Path, scale: f32) -> Result<Vec<f32>>
where
    S: hound::Sample + Into<f64>,
    R: std::io::Read,
{
    reader
        .samples::<S>()
        .map(|sample| {
            sample
                .map(|s| (s.into() / scale as f64) as f32)
                .map_err(|e| MoodsetError::decode(path, format!("Failed to read sample: {}", e)))
        })
        .collect()
}
