use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the tuning engine.
///
/// Everything here is a per-file or structural failure. The two "soft"
/// terminal states of a correction attempt (tolerance not met, re-analysis
/// failed) are not errors: both leave a best-effort artifact on disk and are
/// reported through [`crate::tuning::Correction`] instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Source file unreadable, unsupported, or without an audio track.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// No spectral energy inside the capture band; the tuning is unknown.
    #[error("no measurable tuning in {path} ({low:.0}-{high:.0} Hz band is empty)")]
    AnalysisUnavailable { path: PathBuf, low: f64, high: f64 },

    /// Destination could not be written (permissions, disk space, ...).
    #[error("failed to write {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    /// Resampler construction or processing failure.
    #[error("resampling failed: {0}")]
    Resample(String),

    /// Batch input root does not exist. Aborts the batch before any file.
    #[error("input path not found: {0}")]
    RootNotFound(PathBuf),

    /// Batch input root exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Scratch-file management or rename failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
