//! Audio Decoding Module
//!
//! Turns an audio file into a mono, fixed-rate [`AudioSignal`]. WAV goes through
//! `hound`, falling back to `symphonia` for encodings hound cannot read. MP3, FLAC
//! and anything else Symphonia can probe goes through `symphonia`. Rate conversion
//! uses `rubato` sinc interpolation.

pub mod compressed;
pub mod converter;
pub mod decoder;
pub mod signal;
pub mod wav;

pub use converter::AudioConverter;
pub use decoder::{AudioDecoder, SUPPORTED_EXTENSIONS, is_supported_audio};
pub use signal::AudioSignal;
pub use wav::{AudioData, DecodedAudio};
