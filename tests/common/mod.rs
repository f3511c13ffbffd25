//! Fixture helpers shared by integration tests

#![allow(dead_code)]

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

pub const SR: u32 = 22050;

/// 16-bit mono sine
pub fn write_tone(path: &Path, freq: f32, seconds: f32) {
    write_wav(path, SR, 1, &tone(freq, seconds, SR));
}

/// 16-bit stereo sine at a non-default rate
pub fn write_stereo_tone(path: &Path, freq: f32, seconds: f32, sample_rate: u32) {
    let mono = tone(freq, seconds, sample_rate);
    let interleaved: Vec<f32> = mono.iter().flat_map(|s| [*s, *s * 0.5]).collect();
    write_wav(path, sample_rate, 2, &interleaved);
}

/// Copy a committed file from `tests/fixtures` to `dest`
pub fn copy_fixture(name: &str, dest: &Path) {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    std::fs::copy(source, dest).unwrap();
}

pub fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[f32]) {
    let spec = WavSpec { channels, sample_rate, bits_per_sample: 16, sample_format: SampleFormat::Int };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for s in samples {
        writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

pub fn tone(freq: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let n = (seconds * sample_rate as f32) as usize;
    (0..n)
        .map(|i| 0.4 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

pub fn write_garbage(path: &Path) {
    std::fs::write(path, "definitely not an audio payload, just some text").unwrap();
}
