use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use verdi::batch;
use verdi::cli::{Cli, Command, TuningArgs};
use verdi::config::{self, Config};
use verdi::tuning::{analyze, correct, Correction, CorrectionParams};
use verdi::Error;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect verdi.toml / global config
    let config_path = cli.config.clone().or_else(find_default_config);
    let config = match config_path {
        Some(path) => match config::load_config(&path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Analyze { file } => cmd_analyze(&file, &config),
        Command::Convert {
            input,
            output,
            tuning,
        } => cmd_convert(&input, output, &config, &tuning),
        Command::Batch {
            input_dir,
            output_dir,
            tuning,
        } => cmd_batch(&input_dir, &output_dir, &config, &tuning),
    }
}

fn find_default_config() -> Option<PathBuf> {
    let local = PathBuf::from("verdi.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("verdi").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("verdi").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

// Merge: CLI flags override config values, config overrides built-ins
fn merged_params(config: &Config, args: &TuningArgs) -> CorrectionParams {
    let mut params = config.correction_params();
    if let Some(target) = args.target {
        params.target_hz = target;
    }
    if let Some(tolerance) = args.tolerance {
        params.tolerance_hz = tolerance;
    }
    if let Some(max_iterations) = args.max_iterations {
        params.max_iterations = max_iterations;
    }
    if args.keep_scratch {
        params.keep_scratch = true;
    }
    params
}

fn cmd_analyze(file: &Path, config: &Config) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Input file not found: {}", file.display());
    }

    let audio = verdi::audio::decode_audio(file)?;
    let band = config.capture_band();
    let report = analyze(&audio.to_mono(), audio.sample_rate, &band).ok_or_else(|| {
        Error::AnalysisUnavailable {
            path: file.to_path_buf(),
            low: band.low_hz,
            high: band.high_hz,
        }
    })?;

    let harmonics = report
        .harmonics
        .iter()
        .map(|h| format!("{h:.2}"))
        .collect::<Vec<_>>()
        .join(", ");

    println!("{}", file.display());
    println!("  Dominant frequency: {:.2} Hz", report.dominant_hz);
    println!("  Harmonics:          {harmonics} Hz");
    println!("  Sample rate:        {} Hz", report.sample_rate);
    println!("  Duration:           {:.2} s", report.duration_secs);
    Ok(())
}

fn cmd_convert(
    input: &Path,
    output: Option<PathBuf>,
    config: &Config,
    args: &TuningArgs,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let params = merged_params(config, args);
    let output = output.unwrap_or_else(|| default_output_path(input, &config.output.suffix));
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let state = correct(input, &output, &params)?;
    println!("{}: {state}", input.display());

    if !state.succeeded() {
        anyhow::bail!("conversion of {} did not reach the target", input.display());
    }
    Ok(())
}

fn cmd_batch(input_dir: &Path, output_dir: &Path, config: &Config, args: &TuningArgs) -> Result<()> {
    let params = merged_params(config, args);

    log::info!("Input directory: {}", input_dir.display());
    log::info!("Output directory: {}", output_dir.display());
    log::info!(
        "Target: {:.1} Hz (tolerance {:.1} Hz, max {} iterations)",
        params.target_hz,
        params.tolerance_hz,
        params.max_iterations
    );

    let files = batch::discover_audio_files(input_dir)?;
    if files.is_empty() {
        println!("No audio files found under {}", input_dir.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    let outcomes = batch::convert_files(
        files,
        input_dir,
        output_dir,
        &config.output.suffix,
        &params,
        |outcome| {
            let line = match &outcome.result {
                Ok(state) => format!("{}: {state}", outcome.input.display()),
                Err(err) => format!("{}: {err}", outcome.input.display()),
            };
            pb.println(line);
            pb.inc(1);
        },
    );
    pb.finish_and_clear();

    let converged = outcomes
        .iter()
        .filter(|o| matches!(&o.result, Ok(Correction::Converged { .. })))
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| matches!(&o.result, Ok(Correction::Skipped { .. })))
        .count();
    let failed = outcomes.len() - converged - skipped;

    println!(
        "Converted {converged}, skipped {skipped}, failed {failed} of {} file(s)",
        outcomes.len()
    );

    if failed > 0 {
        anyhow::bail!("{failed} file(s) did not convert cleanly");
    }
    Ok(())
}

fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    input.with_file_name(format!("{stem}{suffix}.wav"))
}
