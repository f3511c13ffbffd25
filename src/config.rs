//! Configuration management for feature extraction and dataset building

use crate::error::{MoodsetError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Process-wide decode rate (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub analysis: AnalysisConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis frame (and FFT) length in samples
    pub frame_length: usize,
    pub hop_length: usize,
    pub n_mels: usize,
    /// Centre of the tempo prior
    pub start_bpm: f64,
    pub max_tempo: f64,
    /// Beat tracker penalty for deviating from the estimated period
    pub tightness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub groups: Vec<GroupConfig>,
    pub output_path: PathBuf,
    /// 0 processes files sequentially
    pub jobs: usize,
    pub sort_entries: bool,
    pub verbose: bool,
}

/// One directory whose audio files all share a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub path: PathBuf,
    pub label: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { sample_rate: DEFAULT_SAMPLE_RATE }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
            n_mels: 128,
            start_bpm: 120.0,
            max_tempo: 320.0,
            tightness: 100.0,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            output_path: PathBuf::from("emotion_dataset.csv"),
            jobs: 0,
            sort_entries: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Get sample rate (convenience method)
    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    /// Get output path (convenience method)
    pub fn output_path(&self) -> &PathBuf {
        &self.batch.output_path
    }

    /// Get worker count (convenience method)
    pub fn jobs(&self) -> usize {
        self.batch.jobs
    }

    /// Get verbose mode (convenience method)
    pub fn verbose(&self) -> bool {
        self.batch.verbose
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "moodset", about = "Build a labeled audio feature dataset", version, author)]
pub struct Args {
    #[arg(short = 'g', long = "group", value_name = "DIR=LABEL", help = "Audio directory and its label (repeatable)")]
    pub groups: Vec<String>,

    #[arg(short = 'o', long = "output", help = "Output CSV path")]
    pub output: Option<PathBuf>,

    #[arg(short = 'r', long = "sample-rate", help = "Decode sample rate (Hz)")]
    pub sample_rate: Option<u32>,

    #[arg(long = "frame-length", help = "Analysis frame length (samples)")]
    pub frame_length: Option<usize>,

    #[arg(long = "hop-length", help = "Analysis hop length (samples)")]
    pub hop_length: Option<usize>,

    #[arg(long = "n-mels", help = "Number of mel bands")]
    pub n_mels: Option<usize>,

    #[arg(short = 'j', long = "jobs", help = "Worker threads per group (0 = sequential)")]
    pub jobs: Option<usize>,

    #[arg(long = "sort", help = "Process files in sorted path order")]
    pub sort: bool,

    #[arg(short = 'c', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,

    #[arg(long = "dry-run", help = "List accepted files per group without decoding")]
    pub dry_run: bool,

    #[arg(long = "write-default-config", value_name = "PATH", help = "Write the default config to PATH and exit")]
    pub write_default_config: Option<PathBuf>,
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args_and_config(args: Args) -> Result<Self> {
        // First load config file (if provided)
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Command line arguments override config file settings
        if let Some(rate) = args.sample_rate {
            config.audio.sample_rate = rate;
        }
        if let Some(frame) = args.frame_length {
            config.analysis.frame_length = frame;
        }
        if let Some(hop) = args.hop_length {
            config.analysis.hop_length = hop;
        }
        if let Some(n_mels) = args.n_mels {
            config.analysis.n_mels = n_mels;
        }
        if let Some(jobs) = args.jobs {
            config.batch.jobs = jobs;
        }
        if let Some(output) = args.output {
            config.batch.output_path = output;
        }
        config.batch.sort_entries |= args.sort;
        config.batch.verbose |= args.verbose;
        for spec in &args.groups {
            config.batch.groups.push(parse_group(spec)?);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MoodsetError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| MoodsetError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate configuration parameter validity
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(MoodsetError::config("Sample rate must be greater than 0"));
        }
        if self.audio.sample_rate > 192000 {
            return Err(MoodsetError::config("Sample rate cannot exceed 192000 Hz"));
        }

        let a = &self.analysis;
        if a.frame_length < 64 || !a.frame_length.is_power_of_two() {
            return Err(MoodsetError::config("Frame length must be a power of two >= 64"));
        }
        if a.hop_length == 0 || a.hop_length > a.frame_length {
            return Err(MoodsetError::config("Hop length must be in range [1, frame_length]"));
        }
        if a.n_mels == 0 || a.n_mels > 512 {
            return Err(MoodsetError::config("Mel band count must be in range [1, 512]"));
        }
        if !(a.start_bpm > 0.0) || !(a.max_tempo > a.start_bpm) {
            return Err(MoodsetError::config("Tempo prior requires 0 < start_bpm < max_tempo"));
        }
        if !(a.tightness > 0.0) {
            return Err(MoodsetError::config("Beat tightness must be greater than 0"));
        }

        if self.batch.jobs > num_cpus::get() * 2 {
            return Err(MoodsetError::config("Worker count cannot exceed 2x logical CPU cores"));
        }
        for group in &self.batch.groups {
            if group.label.trim().is_empty() {
                return Err(MoodsetError::config(format!(
                    "Group {} has an empty label", group.path.display()
                )));
            }
        }

        Ok(())
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MoodsetError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MoodsetError::config(format!("Failed to write config file: {}", e)))
    }

    /// Create default config file
    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}

/// Parse a `DIR=LABEL` command line group. The split happens at the last `=`.
pub fn parse_group(spec: &str) -> Result<GroupConfig> {
    let (path, label) = spec.rsplit_once('=')
        .ok_or_else(|| MoodsetError::config(format!("Group must look like DIR=LABEL: {}", spec)))?;
    if path.is_empty() || label.trim().is_empty() {
        return Err(MoodsetError::config(format!("Group must look like DIR=LABEL: {}", spec)));
    }
    Ok(GroupConfig { path: PathBuf::from(path), label: label.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["moodset"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_rate(), 22050);
        assert_eq!(config.analysis.frame_length, 2048);
        assert_eq!(config.analysis.hop_length, 512);
        assert_eq!(config.analysis.n_mels, 128);
        assert_eq!(config.jobs(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.audio.sample_rate = 0;
        assert!(config.validate().is_err());
        config.audio.sample_rate = 22050;

        config.analysis.frame_length = 1000;
        assert!(config.validate().is_err());
        config.analysis.frame_length = 2048;

        config.analysis.hop_length = 4096;
        assert!(config.validate().is_err());
        config.analysis.hop_length = 512;

        config.analysis.n_mels = 0;
        assert!(config.validate().is_err());
        config.analysis.n_mels = 128;

        config.analysis.max_tempo = 100.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.batch.groups.push(GroupConfig { path: "data/calm".into(), label: "calm".into() });

        assert!(config.save_to_file(&config_path).is_ok());
        let loaded = Config::from_file(&config_path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        std::fs::write(&config_path, "[audio]\nsample_rate = 16000\n\n[[batch.groups]]\npath = \"a\"\nlabel = \"calm\"\n").unwrap();

        let loaded = Config::from_file(&config_path).unwrap();
        assert_eq!(loaded.sample_rate(), 16000);
        assert_eq!(loaded.analysis.hop_length, 512);
        assert_eq!(loaded.batch.groups.len(), 1);
    }

    #[test]
    fn test_args_override() {
        let config = Config::from_args_and_config(args(&[
            "-g", "data/calm=calm", "--group", "data/energetic=energetic",
            "-o", "out.csv", "-r", "16000", "--sort",
        ])).unwrap();
        assert_eq!(config.sample_rate(), 16000);
        assert_eq!(config.output_path(), &PathBuf::from("out.csv"));
        assert!(config.batch.sort_entries);
        assert_eq!(config.batch.groups[1].label, "energetic");
    }

    #[test]
    fn test_parse_group() {
        let g = parse_group("some=dir=calm").unwrap();
        assert_eq!(g.path, PathBuf::from("some=dir"));
        assert_eq!(g.label, "calm");
        assert!(parse_group("no-label").is_err());
        assert!(parse_group("dir=").is_err());
    }
}
