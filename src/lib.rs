//! Moodset - Labeled Audio Feature Datasets
//!
//! Decodes audio files, summarises each as a fixed set of tempo, energy,
//! brightness and mel-spectrum features, and collects the labeled rows of
//! whole directories into one CSV table.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;

pub use audio::{AudioDecoder, AudioSignal};
pub use config::{Args, Config};
pub use dataset::{BatchReport, Dataset, DatasetBuilder, DatasetWriter, LabelGroup};
pub use error::{MoodsetError, Result};
pub use features::{FeatureExtractor, FeatureVector, FEATURE_NAMES};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialise `env_logger`; `RUST_LOG` wins over the verbose default
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init()
        .ok();
}

/// Decode one file and extract its unlabeled features with default settings
pub fn probe_file<P: AsRef<std::path::Path>>(path: P) -> Result<FeatureVector> {
    let signal = AudioDecoder::default().decode(path)?;
    FeatureExtractor::default().extract(&signal)
}

pub fn get_library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)
    }
}
