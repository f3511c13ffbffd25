//! Compressed container decoding (MP3, FLAC, ...) using Symphonia

use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use crate::audio::wav::{AudioData, DecodedAudio};
use crate::error::{MoodsetError, Result};

/// Decode every packet of the first audio track into interleaved f32 PCM.
///
/// The container is sniffed from its content; the extension is only a hint.
pub fn read_compressed<P: AsRef<Path>>(path: P) -> Result<DecodedAudio> {
    let path = path.as_ref();
    log::debug!("Decoding with symphonia: {}", path.display());

    let file = File::open(path)
        .map_err(|e| MoodsetError::decode(path, format!("Cannot open audio file: {}", e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| MoodsetError::decode(path, format!("Unrecognized container: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MoodsetError::decode(path, "No audio track found"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| MoodsetError::decode(path, format!("Unsupported codec: {}", e)))?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(MoodsetError::decode(path, format!("Error reading packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("{}: skipping corrupt packet: {}", path.display(), e);
                continue;
            }
            Err(e) => {
                return Err(MoodsetError::decode(path, format!("Failed to decode packet: {}", e)));
            }
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count();

        // Reallocate when a packet is larger than anything seen so far
        let needed = decoded.capacity() as u64;
        if sample_buf.as_ref().map_or(true, |b| (b.capacity() as u64) < needed * channels as u64) {
            sample_buf = Some(SampleBuffer::new(needed, spec));
        }
        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buf.samples());
        }
    }

    if interleaved.is_empty() {
        return Err(MoodsetError::decode(path, "Audio stream contains no samples"));
    }
    if sample_rate == 0 {
        return Err(MoodsetError::decode(path, "Sample rate unknown"));
    }

    let data = AudioData::from_interleaved(interleaved, channels)
        .map_err(|e| MoodsetError::decode(path, e.to_string()))?;

    log::debug!(
        "Decoded {}: {} Hz, {} ch, {} frames",
        path.display(), sample_rate, channels, data.len()
    );

    Ok(DecodedAudio { sample_rate, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    #[test]
    fn test_flac_fixture() {
        // 0.5 s of a 440 Hz sine at half scale, 22050 Hz mono 16-bit
        let audio = read_compressed(fixture("tone.flac")).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.frames(), 11025);

        let mono = audio.data.to_mono();
        let rms = (mono.iter().map(|v| v * v).sum::<f32>() / mono.len() as f32).sqrt();
        assert!((rms - 0.3536).abs() < 0.01, "rms {}", rms);
        assert!((mono[100] - 0.5 * (2.0 * std::f32::consts::PI * 440.0 * 100.0 / 22050.0).sin()).abs() < 1e-3);
    }

    #[test]
    fn test_mp3_fixture() {
        // 20 silent MPEG-1 layer III frames, 44.1 kHz mono
        let audio = read_compressed(fixture("silence.mp3")).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels(), 1);
        assert!(audio.frames() >= 15 * 1152, "frames {}", audio.frames());
        assert!(audio.data.to_mono().iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.mp3");
        std::fs::write(&path, "this is plain text, not an mpeg stream\n".repeat(64)).unwrap();
        assert!(matches!(read_compressed(&path), Err(MoodsetError::Decode { .. })));
    }

    #[test]
    fn test_zero_byte_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.flac");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(read_compressed(&path), Err(MoodsetError::Decode { .. })));
    }

    #[test]
    fn test_content_sniffing_decodes_pcm() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pcm.wav");
        let spec = WavSpec { channels: 2, sample_rate: 8000, bits_per_sample: 16, sample_format: SampleFormat::Int };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for i in 0..800 {
            let v = ((i as f32 * 0.05).sin() * 16000.0) as i16;
            writer.write_sample(v).unwrap();
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let audio = read_compressed(&path).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.frames(), 800);
    }
}
