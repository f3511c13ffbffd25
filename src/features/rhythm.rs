//! Onset strength, global tempo and beat tracking
//!
//! # Algorithm
//!
//! 1. Onset envelope: positive frame-to-frame difference of the dB mel spectrogram,
//!    averaged across bands.
//! 2. Tempo: time-averaged autocorrelation tempogram (Hann-windowed, per-frame
//!    peak-normalised) scored against a log-normal prior around `start_bpm`.
//! 3. Beats: dynamic programming over the smoothed envelope (Ellis 2007), then
//!    weak leading/trailing beats are trimmed.
//!
//! Autocorrelation uses `ACF = IFFT(|FFT(x)|²)` with enough zero padding to
//! avoid circular wrap.
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use ndarray::ArrayView2;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use super::mel::power_to_db;
use super::stft::hann_window;

/// Tempo prior and tracker parameters
#[derive(Debug, Clone)]
pub struct TempoParams {
    pub start_bpm: f64,
    /// Prior width in octaves
    pub std_bpm: f64,
    /// Autocorrelation window in seconds
    pub ac_size: f64,
    pub max_tempo: f64,
    pub tightness: f64,
}

impl Default for TempoParams {
    fn default() -> Self {
        Self {
            start_bpm: 120.0,
            std_bpm: 1.0,
            ac_size: 8.0,
            max_tempo: 320.0,
            tightness: 100.0,
        }
    }
}

/// Global tempo plus beat positions
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTrack {
    pub tempo: f64,
    /// Envelope frame index of each beat
    pub beat_frames: Vec<usize>,
    /// Beat times in seconds
    pub beat_times: Vec<f64>,
}

impl BeatTrack {
    fn empty() -> Self {
        Self { tempo: 0.0, beat_frames: Vec::new(), beat_times: Vec::new() }
    }

    /// Mean spacing between consecutive beats, if there are at least two
    pub fn mean_interval(&self) -> Option<f64> {
        if self.beat_times.len() < 2 {
            return None;
        }
        let span = self.beat_times[self.beat_times.len() - 1] - self.beat_times[0];
        Some(span / (self.beat_times.len() - 1) as f64)
    }
}

/// Onset strength envelope from a mel power spectrogram (bands x frames).
///
/// Each frame is the median over bands of the positive dB difference, so a
/// rise confined to a few bands does not register as an onset.
/// Output has one value per spectrogram frame, aligned to centred frames.
pub fn onset_strength(mel_power: ArrayView2<f64>, n_fft: usize, hop: usize) -> Vec<f64> {
    let (bands, frames) = mel_power.dim();
    if frames == 0 {
        return Vec::new();
    }
    let db = power_to_db(mel_power, 1.0, 1e-10, Some(80.0));

    let pad = 1 + n_fft / (2 * hop.max(1));
    let mut envelope = vec![0.0; pad.min(frames)];
    let mut flux = Vec::with_capacity(bands);
    for t in 1..frames {
        if envelope.len() >= frames {
            break;
        }
        flux.clear();
        flux.extend((0..bands).map(|b| (db[[b, t]] - db[[b, t - 1]]).max(0.0)));
        envelope.push(median(&mut flux));
    }
    envelope.resize(frames, 0.0);
    envelope
}

/// Median of `values`, 0.0 when empty. Reorders the slice.
fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Estimate a global tempo and track beats on an onset envelope.
///
/// An envelope with no energy degrades to tempo 0.0 and no beats.
pub fn beat_track(onset: &[f64], frame_rate: f64, params: &TempoParams) -> BeatTrack {
    if onset.is_empty() || !onset.iter().any(|&v| v != 0.0) || !(frame_rate > 0.0) {
        log::debug!("Onset envelope is empty or silent, tempo degrades to 0");
        return BeatTrack::empty();
    }

    let tempo = estimate_tempo(onset, frame_rate, params);
    if !(tempo > 0.0) {
        return BeatTrack::empty();
    }

    let beat_frames = track_beats(onset, tempo, frame_rate, params.tightness);
    let beat_times = beat_frames.iter().map(|&f| f as f64 / frame_rate).collect();

    log::debug!("Tempo {:.2} BPM, {} beats", tempo, beat_frames.len());
    BeatTrack { tempo, beat_frames, beat_times }
}

/// Tempo in BPM from the time-averaged autocorrelation tempogram
pub fn estimate_tempo(onset: &[f64], frame_rate: f64, params: &TempoParams) -> f64 {
    let win = ((params.ac_size * frame_rate).floor() as usize).max(2);
    let tempogram = mean_tempogram(onset, win);

    let log2_start = params.start_bpm.log2();
    let mut best: Option<(usize, f64)> = None;
    for (lag, &strength) in tempogram.iter().enumerate().skip(1) {
        let bpm = 60.0 * frame_rate / lag as f64;
        if bpm >= params.max_tempo {
            continue;
        }
        let z = (bpm.log2() - log2_start) / params.std_bpm;
        let log_prior = -0.5 * z * z;
        let score = (1e6 * strength).ln_1p() + log_prior;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((lag, score));
        }
    }

    match best {
        Some((lag, _)) => 60.0 * frame_rate / lag as f64,
        None => {
            log::warn!("No tempo candidate below {:.0} BPM", params.max_tempo);
            0.0
        }
    }
}

/// Autocorrelation of every `win`-long (Hann-windowed) slice of the ramp-padded
/// envelope, each normalised to its peak, averaged over time. Index = lag in frames.
fn mean_tempogram(onset: &[f64], win: usize) -> Vec<f64> {
    let half = win / 2;
    let padded = linear_ramp_pad(onset, half);
    if padded.len() < win {
        return vec![0.0; win];
    }
    let n_frames = padded.len() - win + 1;

    let n_pad = (2 * win - 1).next_power_of_two();
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n_pad);
    let inverse = planner.plan_fft_inverse(n_pad);
    let window = hann_window(win);

    let mut buffer = vec![Complex::<f64>::new(0.0, 0.0); n_pad];
    let mut sum = vec![0.0; win];
    for t in 0..n_frames {
        for (i, cell) in buffer.iter_mut().enumerate() {
            let x = if i < win { padded[t + i] * window[i] } else { 0.0 };
            *cell = Complex::new(x, 0.0);
        }
        forward.process(&mut buffer);
        for c in buffer.iter_mut() {
            *c = Complex::new(c.norm_sqr(), 0.0);
        }
        inverse.process(&mut buffer);

        let peak = buffer[..win].iter().fold(0.0_f64, |m, c| m.max(c.re.abs()));
        if peak > f64::MIN_POSITIVE {
            for (acc, c) in sum.iter_mut().zip(&buffer[..win]) {
                *acc += c.re / peak;
            }
        }
    }

    for v in sum.iter_mut() {
        *v /= n_frames as f64;
    }
    sum
}

/// Pad both ends with a linear ramp from 0 to the edge value
fn linear_ramp_pad(x: &[f64], width: usize) -> Vec<f64> {
    let first = x.first().copied().unwrap_or(0.0);
    let last = x.last().copied().unwrap_or(0.0);
    let mut out = Vec::with_capacity(x.len() + 2 * width);
    out.extend((0..width).map(|i| first * i as f64 / width as f64));
    out.extend_from_slice(x);
    out.extend((0..width).map(|j| last * (width - 1 - j) as f64 / width as f64));
    out
}

/// Dynamic-programming beat tracker. Returns beat frame indices in order.
pub fn track_beats(onset: &[f64], bpm: f64, frame_rate: f64, tightness: f64) -> Vec<usize> {
    let period = ((60.0 * frame_rate / bpm).round() as usize).max(1);
    let local = local_score(onset, period);
    let (backlink, cumscore) = beat_dp(&local, period, tightness);

    let mut beats = vec![last_beat(&cumscore)];
    while let Some(&prev) = beats.last().and_then(|&b| backlink.get(b)) {
        if prev < 0 {
            break;
        }
        beats.push(prev as usize);
    }
    beats.reverse();

    trim_beats(&local, beats)
}

/// Envelope scaled by its sample standard deviation, smoothed with a Gaussian
/// one period wide on each side
fn local_score(onset: &[f64], period: usize) -> Vec<f64> {
    let n = onset.len();
    let std = if n > 1 {
        let mean = onset.iter().sum::<f64>() / n as f64;
        (onset.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    let scale = if std > 0.0 { 1.0 / std } else { 1.0 };

    let p = period as isize;
    let kernel: Vec<f64> = (-p..=p)
        .map(|k| (-0.5 * (k as f64 * 32.0 / period as f64).powi(2)).exp())
        .collect();

    (0..n as isize)
        .map(|i| {
            (-p..=p)
                .filter_map(|d| {
                    let j = i + d;
                    (j >= 0 && j < n as isize)
                        .then(|| onset[j as usize] * scale * kernel[(p - d) as usize])
                })
                .sum()
        })
        .collect()
}

fn beat_dp(local: &[f64], period: usize, tightness: f64) -> (Vec<isize>, Vec<f64>) {
    let n = local.len();
    let mut backlink = vec![-1isize; n];
    let mut cumscore = vec![0.0; n];

    let peak = local.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let threshold = 0.01 * peak;

    let w_start = -2 * period as isize;
    let w_end = -(((period as f64 / 2.0).round() as isize).max(1));
    let txwt: Vec<f64> = (w_start..=w_end)
        .map(|w| -tightness * (-(w as f64) / period as f64).ln().powi(2))
        .collect();

    let mut first_beat = true;
    for (i, &score) in local.iter().enumerate() {
        let mut best = (0usize, f64::NEG_INFINITY);
        for (k, &weight) in txwt.iter().enumerate() {
            let idx = i as isize + w_start + k as isize;
            let candidate = if idx >= 0 { weight + cumscore[idx as usize] } else { weight };
            if candidate > best.1 {
                best = (k, candidate);
            }
        }
        cumscore[i] = score + best.1;

        if first_beat && score < threshold {
            backlink[i] = -1;
        } else {
            backlink[i] = i as isize + w_start + best.0 as isize;
            first_beat = false;
        }
    }

    (backlink, cumscore)
}

/// Last local maximum of the cumulative score that clears half the median peak
fn last_beat(cumscore: &[f64]) -> usize {
    let n = cumscore.len();
    let is_max = |i: usize| {
        i > 0 && cumscore[i] > cumscore[i - 1] && (i + 1 == n || cumscore[i] >= cumscore[i + 1])
    };
    let mut peaks: Vec<f64> = (0..n).filter(|&i| is_max(i)).map(|i| cumscore[i]).collect();
    if peaks.is_empty() {
        return n.saturating_sub(1);
    }
    let threshold = median(&mut peaks);

    (0..n)
        .rev()
        .find(|&i| is_max(i) && 2.0 * cumscore[i] > threshold)
        .unwrap_or(n - 1)
}

/// Keep the span of beats whose smoothed strength clears half the RMS of the
/// smoothed beat strengths
fn trim_beats(local: &[f64], beats: Vec<usize>) -> Vec<usize> {
    // Interior of a 5-point periodic Hann window
    const SMOOTH: [f64; 3] = [0.345_491_502_812_526_3, 0.904_508_497_187_473_7, 0.904_508_497_187_473_7];

    if beats.is_empty() {
        return beats;
    }
    let strengths: Vec<f64> = beats.iter().map(|&b| local[b]).collect();
    let n = strengths.len() as isize;
    let smooth: Vec<f64> = (0..n)
        .map(|i| {
            (0..3isize)
                .filter_map(|k| {
                    let j = i + 1 - k;
                    (j >= 0 && j < n).then(|| strengths[j as usize] * SMOOTH[k as usize])
                })
                .sum::<f64>()
        })
        .collect();
    let threshold = 0.5 * (smooth.iter().map(|v| v * v).sum::<f64>() / smooth.len() as f64).sqrt();

    let start = smooth.iter().position(|&s| s > threshold);
    let end = smooth.iter().rposition(|&s| s > threshold);
    match (start, end) {
        (Some(s), Some(e)) => beats[s..=e].to_vec(),
        _ => Vec::new(),
    }
}
