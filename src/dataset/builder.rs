//! Directory groups to labeled rows
//!
//! Each [`LabelGroup`] is one directory whose direct audio children share a
//! label. A file that fails to decode or extract is reported and skipped;
//! only directory access, schema and pool errors abort the batch.

use std::path::{Path, PathBuf};
use rayon::prelude::*;

use crate::audio::{is_supported_audio, AudioDecoder};
use crate::config::{Config, GroupConfig};
use crate::dataset::Dataset;
use crate::error::{MoodsetError, Result};
use crate::features::{FeatureExtractor, FeatureVector};

/// A directory and the label given to every row it produces
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGroup {
    pub path: PathBuf,
    pub label: String,
}

impl LabelGroup {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, label: S) -> Self {
        Self { path: path.into(), label: label.into() }
    }
}

impl From<GroupConfig> for LabelGroup {
    fn from(group: GroupConfig) -> Self {
        Self { path: group.path, label: group.label }
    }
}

/// A file left out of the dataset and the reason
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: MoodsetError,
}

#[derive(Debug, Clone)]
pub enum FileOutcome {
    Processed { path: PathBuf, label: String },
    Skipped(SkippedFile),
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Processed { path, .. } => path,
            Self::Skipped(skipped) => &skipped.path,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Accepted audio files of one directory, in processing order
#[derive(Debug, Clone, Default)]
pub struct DirectoryScan {
    pub files: Vec<PathBuf>,
    /// Sub-directories and files with unsupported extensions
    pub ignored: usize,
}

/// Per-file outcomes of a batch, in row order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files_scanned: usize,
    pub rows: usize,
    pub ignored: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn skipped(&self) -> impl Iterator<Item = &SkippedFile> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Skipped(s) => Some(s),
            FileOutcome::Processed { .. } => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.files_scanned += other.files_scanned;
        self.rows += other.rows;
        self.ignored += other.ignored;
        self.outcomes.extend(other.outcomes);
    }
}

/// Drives decoding and extraction over labeled directories
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    decoder: AudioDecoder,
    extractor: FeatureExtractor,
    jobs: usize,
    sort_entries: bool,
}

impl DatasetBuilder {
    pub fn new(decoder: AudioDecoder, extractor: FeatureExtractor) -> Self {
        Self { decoder, extractor, jobs: 0, sort_entries: false }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(AudioDecoder::new(config.sample_rate()), FeatureExtractor::new(&config.analysis))
            .with_jobs(config.jobs())
            .with_sorted_entries(config.batch.sort_entries)
    }

    /// Worker threads per group; 0 runs on the calling thread
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_sorted_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// List the supported audio files directly inside `dir`
    pub fn scan<P: AsRef<Path>>(&self, dir: P) -> Result<DirectoryScan> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| MoodsetError::io(format!("Cannot read directory {}: {}", dir.display(), e)))?;

        let mut scan = DirectoryScan::default();
        for entry in entries {
            let path = entry
                .map_err(|e| MoodsetError::io(format!("Cannot list directory {}: {}", dir.display(), e)))?
                .path();
            if path.is_file() && is_supported_audio(&path) {
                scan.files.push(path);
            } else {
                log::debug!("Ignoring {}", path.display());
                scan.ignored += 1;
            }
        }

        if self.sort_entries {
            scan.files.sort();
        }
        Ok(scan)
    }

    /// Decode and extract one file, attaching `label`
    pub fn process_file<P: AsRef<Path>>(&self, path: P, label: &str) -> Result<FeatureVector> {
        let signal = self.decoder.decode(path.as_ref())?;
        Ok(self.extractor.extract(&signal)?.with_label(label))
    }

    pub fn build_group<P: AsRef<Path>>(&self, dir: P, label: &str) -> Result<(Dataset, BatchReport)> {
        let dir = dir.as_ref();
        let scan = self.scan(dir)?;
        log::info!("Group '{}': {} audio files in {}", label, scan.files.len(), dir.display());

        let results = self.run_files(&scan.files, label)?;

        let mut dataset = Dataset::new();
        let mut report = BatchReport {
            files_scanned: scan.files.len(),
            ignored: scan.ignored,
            ..BatchReport::default()
        };

        for (path, result) in scan.files.into_iter().zip(results) {
            match result {
                Ok(features) => {
                    dataset.push(&features)?;
                    log::info!("Processed {} ({})", path.display(), label);
                    report.outcomes.push(FileOutcome::Processed { path, label: label.to_string() });
                }
                Err(error) if error.is_recoverable() => {
                    log::warn!("Skipping {}: {}", path.display(), error);
                    report.outcomes.push(FileOutcome::Skipped(SkippedFile { path, error }));
                }
                Err(error) => return Err(error),
            }
        }

        report.rows = dataset.len();
        Ok((dataset, report))
    }

    /// Build every group and concatenate, groups in the given order
    pub fn build(&self, groups: &[LabelGroup]) -> Result<(Dataset, BatchReport)> {
        let mut dataset = Dataset::new();
        let mut report = BatchReport::default();
        for group in groups {
            let (part, part_report) = self.build_group(&group.path, &group.label)?;
            dataset.append(part)?;
            report.merge(part_report);
        }
        Ok((dataset, report))
    }

    // Results come back indexed like `files`, whatever order workers finish in
    fn run_files(&self, files: &[PathBuf], label: &str) -> Result<Vec<Result<FeatureVector>>> {
        if self.jobs == 0 || files.len() < 2 {
            return Ok(files.iter().map(|p| self.process_file(p, label)).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| MoodsetError::config(format!("Failed to start worker pool: {}", e)))?;

        Ok(pool.install(|| files.par_iter().map(|p| self.process_file(p, label)).collect()))
    }
}
