//! Persistent spectral component tracks
//!
//! A [`Track`] follows one spectral component across analysis blocks; the
//! [`TrackBank`] resolves each block's detected peaks against the live
//! tracks, spawning and evicting as needed. Track identity is the slot in
//! the bank, never the (mutable) center frequency itself.

use std::collections::VecDeque;

use crate::config::AnalyzerConfig;

/// Exponential-moving-average weight kept for the previous center frequency
/// when a track absorbs a newly observed peak.
const CENTER_EMA_OLD: f64 = 0.9;
const CENTER_EMA_NEW: f64 = 0.1;

/// One persistently tracked spectral component
#[derive(Debug, Clone)]
pub struct Track {
    /// Current center-frequency estimate in Hz; nudged toward each matched peak
    center_frequency: f64,
    /// Lock-in phase from the last matched block, in radians
    previous_phase: Option<f64>,
    /// Most recent instantaneous-frequency estimates (trend window)
    inst_freq_history: VecDeque<f64>,
    /// Long per-block drift log: the instantaneous frequency when matched,
    /// 0.0 when missed. Not consumed by the trend statistic.
    drift_log: VecDeque<f64>,
    /// Consecutive blocks without a matching peak
    miss_count: u32,
    /// Whether any peak matched this track in the current block
    seen_this_block: bool,
}

impl Track {
    fn new(frequency: f64) -> Self {
        Self {
            center_frequency: frequency,
            previous_phase: None,
            inst_freq_history: VecDeque::new(),
            drift_log: VecDeque::new(),
            miss_count: 0,
            seen_this_block: false,
        }
    }

    pub fn center_frequency(&self) -> f64 {
        self.center_frequency
    }

    pub fn previous_phase(&self) -> Option<f64> {
        self.previous_phase
    }

    pub fn inst_freq_history(&self) -> &VecDeque<f64> {
        &self.inst_freq_history
    }

    /// Long per-block observation log: instantaneous frequency on a
    /// match, 0.0 on a miss
    pub fn drift_log(&self) -> &VecDeque<f64> {
        &self.drift_log
    }

    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    /// Absorb a matched peak: store the phase reference and instantaneous
    /// frequency produced by the estimator, then blend the observed peak
    /// frequency into the center estimate.
    pub(crate) fn record_match(
        &mut self,
        peak_frequency: f64,
        phase: f64,
        inst_freq: f64,
        smooth: usize,
        hist_len: usize,
    ) {
        self.previous_phase = Some(phase);
        push_bounded(&mut self.inst_freq_history, inst_freq, smooth);
        push_bounded(&mut self.drift_log, inst_freq, hist_len);
        self.seen_this_block = true;
        self.center_frequency =
            CENTER_EMA_OLD * self.center_frequency + CENTER_EMA_NEW * peak_frequency;
    }
}

fn push_bounded(buf: &mut VecDeque<f64>, value: f64, capacity: usize) {
    if capacity == 0 {
        return;
    }
    if buf.len() == capacity {
        buf.pop_front();
    }
    buf.push_back(value);
}

/// Bounded collection of live tracks with match/spawn/evict lifecycle
#[derive(Debug)]
pub struct TrackBank {
    tracks: Vec<Track>,
    tol_hz: f64,
    max_tracks: usize,
    timeout_blocks: u32,
    smooth: usize,
    hist_len: usize,
}

impl TrackBank {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            tol_hz: config.tol_hz(),
            max_tracks: config.max_tracks,
            timeout_blocks: config.timeout_blocks,
            smooth: config.smooth,
            hist_len: config.hist_len,
        }
    }

    /// Drop all track state. Called at the start of every file analysis.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_mut(&mut self, index: usize) -> &mut Track {
        &mut self.tracks[index]
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Reset per-block flags. Run once before matching a block's peaks.
    pub fn begin_block(&mut self) {
        for track in &mut self.tracks {
            track.seen_this_block = false;
        }
    }

    /// Index of the live track whose center frequency is closest to `freq`
    pub fn find_nearest(&self, freq: f64) -> Option<usize> {
        self.tracks
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let ea = (a.center_frequency - freq).abs();
                let eb = (b.center_frequency - freq).abs();
                ea.partial_cmp(&eb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Match `freq` against the nearest track within one bin width
    pub fn match_peak(&self, freq: f64) -> Option<usize> {
        let idx = self.find_nearest(freq)?;
        if (self.tracks[idx].center_frequency - freq).abs() <= self.tol_hz {
            Some(idx)
        } else {
            None
        }
    }

    /// Spawn a new track at `freq`, or `None` when the bank is full.
    /// A dropped peak is a bounded-resource policy, not an error.
    pub fn spawn(&mut self, freq: f64) -> Option<usize> {
        if self.tracks.len() >= self.max_tracks {
            return None;
        }
        self.tracks.push(Track::new(freq));
        Some(self.tracks.len() - 1)
    }

    /// Match an observed peak, spawning when nothing is close enough
    pub fn resolve(&mut self, freq: f64) -> Option<usize> {
        match self.match_peak(freq) {
            Some(idx) => Some(idx),
            None => self.spawn(freq),
        }
    }

    /// Per-block timeout sweep: advance miss counters for unseen tracks,
    /// log the miss in the drift log, and evict tracks that have been
    /// silent for `timeout_blocks` consecutive blocks. Eviction is
    /// permanent; history does not survive it.
    ///
    /// Runs on every block, including those rejected by the silence guard.
    pub fn sweep(&mut self) {
        let timeout = self.timeout_blocks;
        let hist_len = self.hist_len;
        self.tracks.retain_mut(|track| {
            if track.seen_this_block {
                track.miss_count = 0;
                true
            } else {
                track.miss_count += 1;
                push_bounded(&mut track.drift_log, 0.0, hist_len);
                track.miss_count < timeout
            }
        });
    }

    pub(crate) fn smooth(&self) -> usize {
        self.smooth
    }

    pub(crate) fn hist_len(&self) -> usize {
        self.hist_len
    }
}
