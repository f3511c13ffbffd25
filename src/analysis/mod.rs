//! Exploratory analysis beyond the dataset features

pub mod segments;

pub use segments::{Brightness, EnergyLevel, SegmentAnalyzer, SegmentProfile, DEFAULT_SEGMENT_SECONDS};
