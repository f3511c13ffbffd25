//! Error Types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type
///
/// `Decode` and `Extraction` describe a bad input file and are recovered per file
/// by the dataset builder. The rest abort the run.
#[derive(Debug, Clone, Error)]
pub enum MoodsetError {
    #[error("Decode error ({}): {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("Extraction error: {message}")]
    Extraction { message: String },
    #[error("Schema error: {message}")]
    Schema { message: String },
    #[error("Write error ({}): {message}", path.display())]
    Write { path: PathBuf, message: String },
    #[error("Config error: {message}")]
    Config { message: String },
    #[error("IO error: {message}")]
    Io { message: String },
}

impl MoodsetError {
    pub fn decode<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Decode { path: path.as_ref().to_path_buf(), message: msg.into() }
    }
    pub fn extraction<S: Into<String>>(msg: S) -> Self { Self::Extraction { message: msg.into() } }
    pub fn schema<S: Into<String>>(msg: S) -> Self { Self::Schema { message: msg.into() } }
    pub fn write<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Write { path: path.as_ref().to_path_buf(), message: msg.into() }
    }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }
    pub fn io<S: Into<String>>(msg: S) -> Self { Self::Io { message: msg.into() } }

    /// True for per-file failures the batch skips over.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Extraction { .. })
    }

    /// Short label used in skip reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Extraction { .. } => "extraction",
            Self::Schema { .. } => "schema",
            Self::Write { .. } => "write",
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, MoodsetError>;

impl From<std::io::Error> for MoodsetError {
    fn from(err: std::io::Error) -> Self { Self::io(err.to_string()) }
}
