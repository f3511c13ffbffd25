//! CSV output
//!
//! Header is the feature columns followed by `label`; one line per row, no
//! index column. Output goes to a sibling temp file that is renamed into
//! place; a failed write leaves any existing file untouched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::{Dataset, DatasetRow, LABEL_COLUMN};
use crate::error::{MoodsetError, Result};

pub struct DatasetWriter;

impl DatasetWriter {
    /// Write `dataset` to `path`, replacing any existing file
    pub fn write<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
        let path = path.as_ref();
        if dataset.is_empty() {
            log::warn!("Dataset is empty; writing header only to {}", path.display());
        }

        let tmp = temp_path(path);
        if let Err(e) = write_csv(dataset, &tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(MoodsetError::write(path, e.to_string()));
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(MoodsetError::write(path, format!("Failed to move {} into place: {}", tmp.display(), e)));
        }

        log::info!("Wrote {} rows to {}", dataset.len(), path.display());
        Ok(())
    }

    /// Parse a file produced by [`DatasetWriter::write`]
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(|e| read_error(path, e))?;

        let header = reader.headers().map_err(|e| read_error(path, e))?.clone();
        let mut names: Vec<String> = header.iter().map(str::to_string).collect();
        if names.last().map(String::as_str) != Some(LABEL_COLUMN) {
            return Err(MoodsetError::schema(format!(
                "{}: last column must be '{}'", path.display(), LABEL_COLUMN
            )));
        }
        names.pop();
        let mut dataset = Dataset::with_columns(names)?;

        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| read_error(path, e))?;
            let width = record.len().saturating_sub(1);
            let values = record
                .iter()
                .take(width)
                .map(|field| {
                    field.trim().parse::<f64>().map_err(|_| {
                        MoodsetError::schema(format!("{}: row {}: invalid value '{}'", path.display(), line + 1, field))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            let label = record.get(width).unwrap_or_default().to_string();
            dataset.push_row(DatasetRow { values, label })?;
        }

        Ok(dataset)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_csv(dataset: &Dataset, path: &Path) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(dataset.header())?;
    for row in dataset.rows() {
        writer.write_record(
            row.values.iter().map(|v| v.to_string()).chain(std::iter::once(row.label.clone())),
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn read_error(path: &Path, err: csv::Error) -> MoodsetError {
    if err.is_io_error() {
        MoodsetError::io(format!("{}: {}", path.display(), err))
    } else {
        MoodsetError::schema(format!("{}: {}", path.display(), err))
    }
}
