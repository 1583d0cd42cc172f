// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colorful::Colorful;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use driftscan::core::{decode_wav, extract_mono, DriftAnalyzer, FileAnalysis};
use driftscan::synth::{self, ChirpParams, Prng, ToneBankParams};
use driftscan::{AnalyzerConfig, ExperimentConfig};

#[derive(Parser, Debug)]
#[command(name = "driftscan")]
#[command(about = "Detect frequency-drift (chirp) signatures in audio files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the randomized stationary-vs-chirped trial batch
    Experiment {
        /// Repetitions per condition
        #[arg(short = 'n', long, default_value_t = 30)]
        trials: u32,

        /// Duration of each trial signal in seconds
        #[arg(short, long, default_value_t = 10.0)]
        duration: f64,

        /// Nominal chirp rate for the drift condition, Hz/s
        #[arg(long, default_value_t = 500.0)]
        chirp_rate: f64,

        /// Std dev of per-component chirp-rate jitter, Hz/s (0 disables)
        #[arg(long, default_value_t = 50.0)]
        jitter: f64,

        /// Seed for phases, jitter and task ordering
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output CSV path (replaced if it exists)
        #[arg(short, long, default_value = "experimental_results.csv")]
        output: PathBuf,

        /// Directory for temporary trial WAV files
        #[arg(long, default_value = "temp_signals")]
        temp_dir: PathBuf,
    },

    /// Analyze WAV files or directories for drift signatures
    Analyze {
        /// Input files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Analyzer configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON output format
        #[arg(long)]
        json: bool,
    },

    /// Generate example stationary and chirped signals as WAV files
    Generate {
        /// Signal duration in seconds
        #[arg(short, long, default_value_t = 5.0)]
        duration: f64,

        /// Chirp rate of the drift example, Hz/s
        #[arg(long, default_value_t = 500.0)]
        chirp_rate: f64,

        /// Seed for component phases and jitter
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Experiment {
            trials,
            duration,
            chirp_rate,
            jitter,
            seed,
            output,
            temp_dir,
        } => cmd_experiment(ExperimentConfig {
            n_trials: trials,
            duration_secs: duration,
            chirp_rate,
            chirp_jitter_sigma: jitter,
            seed,
            output_csv: output,
            temp_dir,
            ..ExperimentConfig::default()
        }),
        Command::Analyze { paths, config, json } => cmd_analyze(&paths, config.as_deref(), json),
        Command::Generate {
            duration,
            chirp_rate,
            seed,
            output,
        } => cmd_generate(duration, chirp_rate, seed, &output),
    }
}

fn cmd_experiment(config: ExperimentConfig) -> Result<()> {
    println!(
        "Running {} trials per condition ({} s each, chirp rate {} Hz/s)",
        config.n_trials, config.duration_secs, config.chirp_rate
    );

    let summary = driftscan::experiment::run(&config)?;

    if summary.skipped > 0 {
        println!(
            "{}",
            format!("{} trial(s) skipped, see log", summary.skipped).yellow()
        );
    }
    println!(
        "{} {} trials, results in {}",
        "Completed".green(),
        summary.completed,
        config.output_csv.display()
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct AnalyzeReport {
    path: String,
    rho_mean_abs: f64,
    blocks_processed: usize,
    blocks_with_trend: usize,
}

fn cmd_analyze(paths: &[PathBuf], config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = match config_path {
        Some(path) => AnalyzerConfig::from_json_file(path)?,
        None => AnalyzerConfig::default(),
    };

    let files = collect_wav_files(paths)?;
    if files.is_empty() {
        println!("{}", "No WAV files found!".red());
        return Ok(());
    }

    if !json {
        println!("Found {} WAV file(s)\n", files.len());
    }

    // Files are independent; parallelism stays strictly across files
    let results: Vec<(PathBuf, Result<FileAnalysis>)> = files
        .par_iter()
        .progress_count(files.len() as u64)
        .map(|path| {
            let analysis = analyze_file(path, &config);
            (path.clone(), analysis)
        })
        .collect();

    if json {
        let reports: Vec<AnalyzeReport> = results
            .iter()
            .filter_map(|(path, result)| {
                result.as_ref().ok().map(|a| AnalyzeReport {
                    path: path.display().to_string(),
                    rho_mean_abs: a.rho_mean_abs,
                    blocks_processed: a.blocks_processed,
                    blocks_with_trend: a.blocks_with_trend,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (path, result) in &results {
            match result {
                Ok(analysis) => print_analysis(path, analysis),
                Err(e) => println!(
                    "{}: {}",
                    path.display().to_string().cyan(),
                    format!("{e:#}").red()
                ),
            }
        }
    }

    let failures = results.iter().filter(|(_, r)| r.is_err()).count();
    if failures > 0 {
        anyhow::bail!("{} file(s) failed to analyze", failures);
    }
    Ok(())
}

fn analyze_file(path: &Path, config: &AnalyzerConfig) -> Result<FileAnalysis> {
    let audio = decode_wav(path)?;
    let mono = extract_mono(&audio);
    let mut analyzer = DriftAnalyzer::with_config(config.clone());
    analyzer
        .analyze(&mono, audio.sample_rate)
        .with_context(|| format!("Failed to analyze {}", path.display()))
}

fn print_analysis(path: &Path, analysis: &FileAnalysis) {
    println!("{}", path.display().to_string().cyan());
    println!(
        "  rho_mean_abs: {:.4}  ({} blocks, {} with trend)",
        analysis.rho_mean_abs, analysis.blocks_processed, analysis.blocks_with_trend
    );
}

fn collect_wav_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_wav(path) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.path().is_file() && is_wav(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            anyhow::bail!("Input path does not exist: {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

fn cmd_generate(duration: f64, chirp_rate: f64, seed: u64, output: &Path) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let fs = 48000;
    let tones = ToneBankParams::default();
    let mut rng = Prng::new(seed);

    let stationary = synth::stationary_tones(duration, fs, &tones, &mut rng);
    let stationary_path = output.join("stationary.wav");
    synth::write_wav(&stationary_path, &stationary, fs)?;
    println!("Saved: {}", stationary_path.display().to_string().cyan());

    let chirp = ChirpParams {
        rate: chirp_rate,
        ..ChirpParams::default()
    };
    let chirped = synth::chirped_tones(duration, fs, &tones, &chirp, &mut rng);
    let chirped_path = output.join("chirped.wav");
    synth::write_wav(&chirped_path, &chirped, fs)?;
    println!("Saved: {}", chirped_path.display().to_string().cyan());

    Ok(())
}
