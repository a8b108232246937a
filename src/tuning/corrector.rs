use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::audio::{apply_speed, decode_audio, AudioData};
use crate::encode::wav;
use crate::error::{Error, Result};
use crate::tuning::estimator::{analyze, CaptureBand};

/// Knobs for a correction run. `Default` gives the standard 432 Hz setup.
#[derive(Debug, Clone)]
pub struct CorrectionParams {
    /// Frequency the dominant tuning should land on, in Hz.
    pub target_hz: f64,
    /// How far from the target a measurement may sit and still count as done.
    pub tolerance_hz: f64,
    /// Upper bound on resample passes before giving up.
    pub max_iterations: usize,
    pub band: CaptureBand,
    /// Leave `_temp_<n>.wav` verification files on disk instead of removing
    /// them once the run settles.
    pub keep_scratch: bool,
}

impl Default for CorrectionParams {
    fn default() -> Self {
        Self {
            target_hz: 432.0,
            tolerance_hz: 0.5,
            max_iterations: 3,
            band: CaptureBand::default(),
            keep_scratch: false,
        }
    }
}

/// Terminal state of a correction run.
///
/// Only hard faults (decode, encode, I/O) surface as `Error`; every outcome
/// of a run that completed is a variant here, including the unsuccessful
/// ones, so batch callers can keep going and tally them.
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    /// Input already measured at or below target (within tolerance); no
    /// output file was written.
    Skipped { measured_hz: f64 },
    /// Verified within tolerance; the promoted output is at `final_hz`.
    Converged { final_hz: f64, iterations: usize },
    /// Ran out of iterations; the last candidate was still written to the
    /// output path as a best effort.
    ToleranceNotMet { final_hz: f64, iterations: usize },
    /// A resampled candidate could not be measured again. The candidate was
    /// written to the output path as a best effort; `last_hz` is the final
    /// measurement that did succeed.
    ReanalysisFailed { last_hz: f64, iterations: usize },
}

impl Correction {
    /// True when the run ended in a verified state.
    pub fn succeeded(&self) -> bool {
        matches!(self, Correction::Skipped { .. } | Correction::Converged { .. })
    }

    /// True when a file exists at the output path after the run.
    pub fn wrote_output(&self) -> bool {
        !matches!(self, Correction::Skipped { .. })
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::Skipped { measured_hz } => {
                write!(f, "measured {measured_hz:.2} Hz, no correction needed")
            }
            Correction::Converged {
                final_hz,
                iterations,
            } => write!(f, "tuned to {final_hz:.2} Hz in {iterations} iteration(s)"),
            Correction::ToleranceNotMet {
                final_hz,
                iterations,
            } => write!(
                f,
                "stopped at {final_hz:.2} Hz after {iterations} iteration(s), tolerance not met"
            ),
            Correction::ReanalysisFailed {
                last_hz,
                iterations,
            } => write!(
                f,
                "verification lost after {iterations} iteration(s), last measured {last_hz:.2} Hz"
            ),
        }
    }
}

/// Retune one file toward `params.target_hz` and write the result to
/// `output`.
///
/// The loop measures the dominant frequency, slows the audio by
/// `target / measured`, writes the candidate to a scratch file next to the
/// output, and measures again. A candidate inside the tolerance window is
/// promoted to `output` by rename, so the output path never holds a
/// half-written file. When the iteration budget runs out, or a candidate can
/// no longer be measured, the last candidate is written to `output` anyway
/// and the shortfall is reported in the returned [`Correction`].
///
/// Inputs that already measure at or below the target are left alone; a
/// correction can only slow audio down, never speed it up.
pub fn correct(input: &Path, output: &Path, params: &CorrectionParams) -> Result<Correction> {
    let source = decode_audio(input)?;
    let report = analyze(&source.to_mono(), source.sample_rate, &params.band).ok_or_else(|| {
        Error::AnalysisUnavailable {
            path: input.to_path_buf(),
            low: params.band.low_hz,
            high: params.band.high_hz,
        }
    })?;

    let mut current_hz = report.dominant_hz;
    log::info!("{}: dominant frequency {:.2} Hz", input.display(), current_hz);
    log::debug!(
        "{}: strongest bins {:?}",
        input.display(),
        report.harmonics
    );

    if current_hz - params.target_hz <= params.tolerance_hz {
        log::info!(
            "{}: already at or below {:.0} Hz, leaving untouched",
            input.display(),
            params.target_hz
        );
        return Ok(Correction::Skipped {
            measured_hz: current_hz,
        });
    }

    let mut working = source;
    let mut scratches: Vec<PathBuf> = Vec::new();

    for pass in 0..params.max_iterations {
        let speed = params.target_hz / current_hz;
        log::info!(
            "{}: iteration {} applying speed ratio {:.6}",
            input.display(),
            pass + 1,
            speed
        );

        let candidate = AudioData {
            samples: apply_speed(&working.samples, working.channels, speed)?,
            sample_rate: working.sample_rate,
            channels: working.channels,
        };

        let scratch = scratch_path(output, pass);
        wav::write(&scratch, &candidate)?;
        scratches.push(scratch.clone());

        let verified = analyze(&candidate.to_mono(), candidate.sample_rate, &params.band);
        let Some(next) = verified else {
            log::warn!(
                "{}: candidate from iteration {} has no measurable tuning",
                input.display(),
                pass + 1
            );
            wav::write(output, &candidate)?;
            discard_scratches(&scratches, params.keep_scratch);
            return Ok(Correction::ReanalysisFailed {
                last_hz: current_hz,
                iterations: pass + 1,
            });
        };

        log::info!(
            "{}: post-adjustment tuning {:.2} Hz",
            input.display(),
            next.dominant_hz
        );

        if (next.dominant_hz - params.target_hz).abs() <= params.tolerance_hz {
            wav::promote(&scratch, output)?;
            scratches.pop();
            discard_scratches(&scratches, params.keep_scratch);
            log::info!(
                "{}: verified at {:.2} Hz, promoted to {}",
                input.display(),
                next.dominant_hz,
                output.display()
            );
            return Ok(Correction::Converged {
                final_hz: next.dominant_hz,
                iterations: pass + 1,
            });
        }

        working = candidate;
        current_hz = next.dominant_hz;
    }

    log::warn!(
        "{}: still at {:.2} Hz after {} iteration(s), writing last attempt",
        input.display(),
        current_hz,
        params.max_iterations
    );
    wav::write(output, &working)?;
    discard_scratches(&scratches, params.keep_scratch);
    Ok(Correction::ToleranceNotMet {
        final_hz: current_hz,
        iterations: params.max_iterations,
    })
}

/// Scratch file for verification pass `pass`, placed next to the output.
fn scratch_path(output: &Path, pass: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{stem}_temp_{pass}.wav"))
}

/// Remove scratch files once a run has settled. Never fails the run: a
/// scratch that will not delete is only noise on disk.
fn discard_scratches(paths: &[PathBuf], keep: bool) {
    if keep {
        return;
    }
    for path in paths {
        if let Err(err) = fs::remove_file(path) {
            if err.kind() != io::ErrorKind::NotFound {
                log::warn!("could not remove scratch file {}: {}", path.display(), err);
            }
        }
    }
}
