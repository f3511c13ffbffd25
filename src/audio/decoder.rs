//! File path to [`AudioSignal`]

use std::path::Path;
use crate::audio::{compressed, wav, AudioConverter, AudioSignal};
use crate::config::DEFAULT_SAMPLE_RATE;
use crate::error::{MoodsetError, Result};

/// Extensions accepted as input audio (matched case-insensitively)
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "flac"];

pub fn is_supported_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Loads files as mono signals at one fixed sample rate
#[derive(Debug, Clone, Copy)]
pub struct AudioDecoder {
    sample_rate: u32,
}

impl Default for AudioDecoder {
    fn default() -> Self {
        Self { sample_rate: DEFAULT_SAMPLE_RATE }
    }
}

impl AudioDecoder {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Decode, down-mix and resample. Every failure is a `Decode` error carrying the path.
    pub fn decode<P: AsRef<Path>>(&self, path: P) -> Result<AudioSignal> {
        let path = path.as_ref();

        let is_wav = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);

        let decoded = if is_wav {
            // hound covers PCM; other WAV encodings go through symphonia
            match wav::read_wav(path) {
                Ok(decoded) => decoded,
                Err(err) => {
                    log::debug!("{}: hound rejected the file ({}), retrying with symphonia", path.display(), err);
                    compressed::read_compressed(path).map_err(|_| err)?
                }
            }
        } else {
            compressed::read_compressed(path)?
        };

        let samples = AudioConverter::to_mono_at_rate(&decoded, self.sample_rate)
            .map_err(|e| MoodsetError::decode(path, e.to_string()))?;

        if samples.iter().any(|s| !s.is_finite()) {
            return Err(MoodsetError::decode(path, "Decoded audio contains non-finite samples"));
        }

        let signal = AudioSignal::new(samples, self.sample_rate)
            .map_err(|e| MoodsetError::decode(path, e.to_string()))?;

        log::debug!(
            "Signal {}: {:.2}s source ({} Hz, {} ch) -> {} samples at {} Hz",
            path.display(), decoded.duration(), decoded.sample_rate, decoded.channels(),
            signal.len(), signal.sample_rate()
        );

        Ok(signal)
    }
}
