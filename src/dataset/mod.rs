//! Labeled Feature Dataset
//!
//! An ordered table of feature rows that share one column schema. Rows keep
//! insertion order; a row with a different column count, or a concatenation
//! of tables with different columns, is a `Schema` error.

pub mod builder;
pub mod writer;

pub use builder::{BatchReport, DatasetBuilder, DirectoryScan, FileOutcome, LabelGroup, SkippedFile};
pub use writer::DatasetWriter;

use crate::error::{MoodsetError, Result};
use crate::features::{FeatureVector, FEATURE_NAMES};

/// Name of the trailing label column
pub const LABEL_COLUMN: &str = "label";

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub values: Vec<f64>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature column names, label excluded
    columns: Vec<String>,
    rows: Vec<DatasetRow>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl Dataset {
    /// Empty table with the standard feature schema
    pub fn new() -> Self {
        Self {
            columns: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Empty table with a custom feature schema
    pub fn with_columns(columns: Vec<String>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if name.is_empty() || name == LABEL_COLUMN {
                return Err(MoodsetError::schema(format!("Invalid feature column name: {:?}", name)));
            }
            if columns[..i].contains(name) {
                return Err(MoodsetError::schema(format!("Duplicate column: {}", name)));
            }
        }
        Ok(Self { columns, rows: Vec::new() })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Feature columns followed by `label`
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).chain(std::iter::once(LABEL_COLUMN)).collect()
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a raw row; its width must match the schema
    pub fn push_row(&mut self, row: DatasetRow) -> Result<()> {
        if row.values.len() != self.columns.len() {
            return Err(MoodsetError::schema(format!(
                "Row has {} values, schema has {} columns", row.values.len(), self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a labeled feature vector
    pub fn push(&mut self, features: &FeatureVector) -> Result<()> {
        let label = features.label()
            .ok_or_else(|| MoodsetError::schema("Feature vector has no label"))?;
        if self.columns.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(MoodsetError::schema("Dataset columns do not match the feature schema"));
        }
        self.push_row(DatasetRow { values: features.values().to_vec(), label: label.to_string() })
    }

    /// Append all rows of `other`, which must have identical columns
    pub fn append(&mut self, other: Dataset) -> Result<()> {
        if self.columns != other.columns {
            return Err(MoodsetError::schema(format!(
                "Cannot concatenate datasets with columns {:?} and {:?}", self.columns, other.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Concatenate in order
    pub fn concat<I: IntoIterator<Item = Dataset>>(parts: I) -> Result<Self> {
        let mut parts = parts.into_iter();
        let mut merged = match parts.next() {
            Some(first) => first,
            None => return Ok(Self::new()),
        };
        for part in parts {
            merged.append(part)?;
        }
        Ok(merged)
    }

    /// Number of rows per label, in order of first appearance
    pub fn label_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for row in &self.rows {
            match counts.iter_mut().find(|(l, _)| *l == row.label) {
                Some((_, n)) => *n += 1,
                None => counts.push((row.label.clone(), 1)),
            }
        }
        counts
    }
}
