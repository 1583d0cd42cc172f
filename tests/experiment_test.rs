// tests/experiment_test.rs
//
// Batch-level behavior: scheduling, CSV persistence, temp-file hygiene.
// Uses a tiny trial count so the whole batch stays fast.

use std::path::PathBuf;

use driftscan::experiment::{self, ExperimentConfig};

fn small_config(dir: &std::path::Path) -> ExperimentConfig {
    ExperimentConfig {
        n_trials: 2,
        duration_secs: 1.0,
        seed: 42,
        output_csv: dir.join("results.csv"),
        temp_dir: dir.join("temp_signals"),
        ..ExperimentConfig::default()
    }
}

#[test]
fn experiment_batch_writes_one_row_per_trial() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());

    let summary = experiment::run(&config).unwrap();
    assert_eq!(summary.completed, 4);
    assert_eq!(summary.skipped, 0);

    let contents = std::fs::read_to_string(&config.output_csv).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 5); // header + 4 trials
    assert_eq!(lines[0], "trial_id,condition,chirp_rate,rho_mean_abs,timestamp");

    let stationary = lines[1..].iter().filter(|l| l.contains(",stationary,")).count();
    let chirped = lines[1..].iter().filter(|l| l.contains(",chirped,")).count();
    assert_eq!(stationary, 2);
    assert_eq!(chirped, 2);
}

#[test]
fn experiment_replaces_stale_results() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());

    std::fs::write(&config.output_csv, "stale data\n").unwrap();
    experiment::run(&config).unwrap();

    let contents = std::fs::read_to_string(&config.output_csv).unwrap();
    assert!(!contents.contains("stale data"));
    assert!(contents.starts_with("trial_id,"));
}

#[test]
fn experiment_cleans_temp_wavs() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());

    experiment::run(&config).unwrap();

    let leftovers: Vec<PathBuf> = std::fs::read_dir(&config.temp_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    assert!(leftovers.is_empty(), "temp WAVs left behind: {leftovers:?}");
}

#[test]
fn experiment_is_seed_reproducible() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();

    experiment::run(&small_config(dir_a.path())).unwrap();
    experiment::run(&small_config(dir_b.path())).unwrap();

    let strip_timestamps = |contents: String| -> Vec<String> {
        contents
            .lines()
            .map(|l| l.rsplit_once(',').map(|(head, _)| head.to_string()).unwrap_or_default())
            .collect()
    };

    let a = strip_timestamps(std::fs::read_to_string(dir_a.path().join("results.csv")).unwrap());
    let b = strip_timestamps(std::fs::read_to_string(dir_b.path().join("results.csv")).unwrap());
    assert_eq!(a, b);
}
