use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "verdi", about = "432 Hz tuning analyzer and converter", version)]
pub struct Cli {
    /// Config file (default: verdi.toml, then ~/.config/verdi/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Measure a file's dominant tuning frequency
    Analyze {
        /// Audio file to inspect (WAV, MP3, FLAC, AAC)
        file: PathBuf,
    },

    /// Retune a single file toward the target frequency
    Convert {
        /// Audio file to convert
        input: PathBuf,

        /// Converted WAV path (default: beside the input, with the output suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Convert every supported audio file under a directory tree
    Batch {
        /// Directory scanned recursively for audio files
        input_dir: PathBuf,

        /// Directory receiving the mirrored converted tree
        output_dir: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

/// Correction knobs shared by `convert` and `batch`. A flag left unset falls
/// back to the config file, then to the built-in defaults.
#[derive(Args, Debug)]
pub struct TuningArgs {
    /// Target frequency in Hz (default 432)
    #[arg(long)]
    pub target: Option<f64>,

    /// Convergence tolerance in Hz (default 0.5)
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Resample passes to attempt before giving up (default 3)
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Keep per-iteration _temp_<n>.wav files instead of deleting them
    #[arg(long)]
    pub keep_scratch: bool,
}
