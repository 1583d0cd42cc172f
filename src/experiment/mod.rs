//! Experiment orchestration
//!
//! Schedules a randomized batch of null/drift trials, synthesizes each
//! trial signal, round-trips it through a temporary WAV file, runs the
//! analyzer, and appends one CSV row per completed trial. Trials are
//! independent; a failed trial is logged and skipped, never aborting the
//! batch.

pub mod sink;

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::core::{decode_wav, extract_mono, DriftAnalyzer};
use crate::synth::{self, ChirpParams, Prng, ToneBankParams};

pub use sink::{ResultSink, TrialRecord};

/// Trial condition: the closed label set persisted with every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Null condition: stationary multitone signal
    Stationary,
    /// Target condition: linearly chirped multitone signal
    Chirped,
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Stationary => "stationary",
            Condition::Chirped => "chirped",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Experiment batch parameters
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Repetitions per condition
    pub n_trials: u32,
    /// Duration of each trial signal in seconds
    pub duration_secs: f64,
    /// Sample rate for synthesis and analysis
    pub fs: u32,
    /// Nominal chirp rate for the drift condition, Hz/s
    pub chirp_rate: f64,
    /// Random phases per component in the drift condition
    pub vary_phases: bool,
    /// Gaussian jitter on the per-component chirp rate, Hz/s std dev
    pub chirp_jitter_sigma: f64,
    /// Seed for phases, jitter and task-order shuffling
    pub seed: u64,
    /// Destination CSV; any pre-existing file is replaced at batch start
    pub output_csv: PathBuf,
    /// Directory for per-trial temporary WAV files
    pub temp_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_trials: 30,
            duration_secs: 10.0,
            fs: 48000,
            chirp_rate: 500.0,
            vary_phases: true,
            chirp_jitter_sigma: 50.0,
            seed: 42,
            output_csv: PathBuf::from("experimental_results.csv"),
            temp_dir: PathBuf::from("temp_signals"),
        }
    }
}

impl ExperimentConfig {
    /// Analyzer tuning for experiment runs: track capacity is raised to
    /// cover the full tone bank and the trend window is slightly longer.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            fs: self.fs,
            max_tracks: 50,
            smooth: 10,
            ..AnalyzerConfig::default()
        }
    }
}

/// One scheduled trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Task {
    pub trial_id: u32,
    pub condition: Condition,
    /// 0.0 for the null condition, the nominal rate for the drift condition
    pub chirp_rate: f64,
}

/// Batch outcome summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentSummary {
    pub completed: u32,
    pub skipped: u32,
}

/// Build the randomized task list: one stationary and one chirped trial
/// per trial id, shuffled into a single execution order.
pub fn schedule_tasks(n_trials: u32, chirp_rate: f64, rng: &mut Prng) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(n_trials as usize * 2);
    for i in 0..n_trials {
        tasks.push(Task {
            trial_id: i + 1,
            condition: Condition::Stationary,
            chirp_rate: 0.0,
        });
        tasks.push(Task {
            trial_id: i + 1,
            condition: Condition::Chirped,
            chirp_rate,
        });
    }
    rng.shuffle(&mut tasks);
    tasks
}

/// Run the full experiment batch
pub fn run(config: &ExperimentConfig) -> Result<ExperimentSummary> {
    if config.output_csv.exists() {
        std::fs::remove_file(&config.output_csv).with_context(|| {
            format!("Failed to remove stale results file: {}", config.output_csv.display())
        })?;
        info!("removed previous results file {}", config.output_csv.display());
    }
    std::fs::create_dir_all(&config.temp_dir).with_context(|| {
        format!("Failed to create temp directory: {}", config.temp_dir.display())
    })?;

    let sink = ResultSink::new(&config.output_csv)?;
    let mut analyzer = DriftAnalyzer::with_config(config.analyzer_config());
    let mut rng = Prng::new(config.seed);
    let tasks = schedule_tasks(config.n_trials, config.chirp_rate, &mut rng);

    let tones = ToneBankParams::default();
    let mut completed = 0u32;
    let mut skipped = 0u32;

    for (i, task) in tasks.iter().enumerate() {
        info!(
            "trial {}/{}: id {} condition {}",
            i + 1,
            tasks.len(),
            task.trial_id,
            task.condition
        );

        let signal = match task.condition {
            Condition::Stationary => {
                synth::stationary_tones(config.duration_secs, config.fs, &tones, &mut rng)
            }
            Condition::Chirped => {
                let chirp = ChirpParams {
                    rate: task.chirp_rate,
                    vary_phases: config.vary_phases,
                    jitter_sigma: config.chirp_jitter_sigma,
                };
                synth::chirped_tones(config.duration_secs, config.fs, &tones, &chirp, &mut rng)
            }
        };

        let wav_path = config.temp_dir.join(format!(
            "trial_{}_{}.wav",
            task.trial_id,
            task.condition.label()
        ));

        match run_trial(&mut analyzer, task, &signal, &wav_path, config.fs) {
            Ok(record) => {
                sink.append(&record)?;
                completed += 1;
            }
            Err(e) => {
                warn!(
                    "trial {} ({}) skipped: {:#}",
                    task.trial_id, task.condition, e
                );
                skipped += 1;
            }
        }

        // Best-effort cleanup; a stale temp file is not worth aborting for
        let _ = std::fs::remove_file(&wav_path);
    }

    info!(
        "experiment finished: {} completed, {} skipped, results in {}",
        completed,
        skipped,
        config.output_csv.display()
    );

    Ok(ExperimentSummary { completed, skipped })
}

/// Round-trip one trial through disk and the analyzer
fn run_trial(
    analyzer: &mut DriftAnalyzer,
    task: &Task,
    signal: &[f32],
    wav_path: &std::path::Path,
    fs: u32,
) -> Result<TrialRecord> {
    synth::write_wav(wav_path, signal, fs)?;

    let audio = decode_wav(wav_path)?;
    let mono = extract_mono(&audio);
    let analysis = analyzer.analyze(&mono, audio.sample_rate)?;

    Ok(TrialRecord {
        trial_id: task.trial_id,
        condition: task.condition,
        chirp_rate: task.chirp_rate,
        rho_mean_abs: analysis.rho_mean_abs,
        timestamp: Utc::now().timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_pairs_every_trial_id() {
        let mut rng = Prng::new(42);
        let tasks = schedule_tasks(30, 500.0, &mut rng);

        assert_eq!(tasks.len(), 60);
        for id in 1..=30 {
            assert!(tasks
                .iter()
                .any(|t| t.trial_id == id && t.condition == Condition::Stationary));
            assert!(tasks
                .iter()
                .any(|t| t.trial_id == id && t.condition == Condition::Chirped));
        }
    }

    #[test]
    fn test_schedule_params_per_condition() {
        let mut rng = Prng::new(42);
        let tasks = schedule_tasks(5, 500.0, &mut rng);

        for task in &tasks {
            match task.condition {
                Condition::Stationary => assert_eq!(task.chirp_rate, 0.0),
                Condition::Chirped => assert_eq!(task.chirp_rate, 500.0),
            }
        }
    }

    #[test]
    fn test_schedule_is_seed_deterministic() {
        let a = schedule_tasks(10, 500.0, &mut Prng::new(3));
        let b = schedule_tasks(10, 500.0, &mut Prng::new(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_condition_labels() {
        assert_eq!(Condition::Stationary.label(), "stationary");
        assert_eq!(Condition::Chirped.label(), "chirped");
        assert_eq!(
            serde_json::to_string(&Condition::Chirped).unwrap(),
            "\"chirped\""
        );
    }
}
