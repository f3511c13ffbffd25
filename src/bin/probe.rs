//! Single-file feature probe
//!
//! Prints the feature vector of one audio file, optionally with beat times and
//! a per-segment energy/brightness profile.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use moodset::analysis::SegmentAnalyzer;
use moodset::config::{AnalysisConfig, DEFAULT_SAMPLE_RATE};
use moodset::{init_logging, AudioDecoder, FeatureExtractor};

#[derive(Parser, Debug)]
#[command(name = "moodset-probe")]
#[command(about = "Print the audio features of a single file")]
struct Args {
    /// Input audio file
    #[arg(short, long)]
    input: PathBuf,

    /// Decode sample rate
    #[arg(short = 'r', long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Also profile consecutive segments of this many seconds
    #[arg(long, value_name = "SECONDS")]
    segments: Option<f64>,

    /// Print beat timestamps
    #[arg(long)]
    beats: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let analysis_config = AnalysisConfig::default();
    let segment_analyzer = args
        .segments
        .map(|seconds| SegmentAnalyzer::new(seconds, &analysis_config))
        .transpose()?;

    let signal = AudioDecoder::new(args.sample_rate)
        .decode(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    println!("=== Moodset Feature Probe ===");
    println!("Input: {}", args.input.display());
    println!("Sample rate: {} Hz", signal.sample_rate());
    println!("Duration: {:.2}s", signal.duration());
    println!("=============================");

    let analysis = FeatureExtractor::new(&analysis_config).analyze(&signal)?;
    for (name, value) in analysis.features.iter() {
        println!("{}: {:.4}", name, value);
    }

    if args.beats {
        let beats = &analysis.beats;
        println!("\n=== Beats ===");
        println!("Detected beats: {}", beats.beat_times.len());
        if beats.tempo > 0.0 {
            println!("Expected interval: {:.3}s", 60.0 / beats.tempo);
        }
        if let Some(interval) = beats.mean_interval() {
            println!("Mean interval: {:.3}s", interval);
        }
        for time in &beats.beat_times {
            println!("  {:.3}", time);
        }
    }

    if let Some(analyzer) = segment_analyzer {
        println!("\n=== Segments ({}s) ===", analyzer.segment_seconds());
        for segment in analyzer.analyze(&signal) {
            println!("Segment {}: {:.0}-{:.0}s", segment.index + 1, segment.start_secs, segment.end_secs);
            println!("  Mean energy: {:.4} ({})", segment.rms_mean, segment.energy);
            println!("  Mean spectral centroid: {:.1} Hz ({})", segment.centroid_mean, segment.brightness);
        }
    }

    Ok(())
}
