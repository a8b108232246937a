use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::tuning::{correct, Correction, CorrectionParams};

/// Container formats the walker picks up, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["wav", "mp3", "flac", "aac"];

/// Appended to each output file's stem so converted files are recognizable
/// next to their originals.
pub const DEFAULT_SUFFIX: &str = "_432Hz";

/// One file's journey through a batch run.
///
/// `result` holds either the terminal [`Correction`] state or the hard error
/// that stopped this file. Either way the batch moved on to the next file.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<Correction>,
}

impl ConversionOutcome {
    /// True when this file ended verified in tune (converged or skipped).
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(state) if state.succeeded())
    }
}

/// Convert every supported audio file under `input_root`, mirroring the
/// directory layout under `output_root`.
///
/// Discovery and conversion in one call; callers that need the file list
/// up front (the CLI sizes its progress bar from it) run
/// [`discover_audio_files`] themselves and hand the list to
/// [`convert_files`], so the tree is only walked once.
pub fn convert_all(
    input_root: &Path,
    output_root: &Path,
    suffix: &str,
    params: &CorrectionParams,
    observer: impl FnMut(&ConversionOutcome),
) -> Result<Vec<ConversionOutcome>> {
    let files = discover_audio_files(input_root)?;
    Ok(convert_files(
        files,
        input_root,
        output_root,
        suffix,
        params,
        observer,
    ))
}

/// Drive the corrector over an already-discovered list of files.
///
/// `observer` fires once per finished file, in list order, before the next
/// file starts; console progress hangs off it so this function stays silent
/// apart from the log. Everything that goes wrong with an individual file is
/// captured in its [`ConversionOutcome`] and the run continues.
pub fn convert_files(
    files: Vec<PathBuf>,
    input_root: &Path,
    output_root: &Path,
    suffix: &str,
    params: &CorrectionParams,
    mut observer: impl FnMut(&ConversionOutcome),
) -> Vec<ConversionOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());
    for input in files {
        let output = derive_output_path(input_root, output_root, &input, suffix);
        let result = convert_one(&input, &output, params);
        if let Err(err) = &result {
            log::warn!("{}: {}", input.display(), err);
        }

        let outcome = ConversionOutcome {
            input,
            output,
            result,
        };
        observer(&outcome);
        outcomes.push(outcome);
    }

    outcomes
}

fn convert_one(input: &Path, output: &Path, params: &CorrectionParams) -> Result<Correction> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    correct(input, output, params)
}

/// Walk `root` and collect supported audio files in deterministic order.
///
/// The root is validated before the walk starts: a missing path is
/// [`Error::RootNotFound`], a non-directory is [`Error::NotADirectory`].
/// Unreadable entries below a valid root are logged and skipped.
pub fn discover_audio_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Error::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };
        if entry.file_type().is_file() && has_supported_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    log::info!(
        "found {} audio file(s) under {}",
        files.len(),
        root.display()
    );
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Mirror `input`'s position under `input_root` into `output_root`, with the
/// suffix appended to the stem and the extension forced to `.wav`.
fn derive_output_path(
    input_root: &Path,
    output_root: &Path,
    input: &Path,
    suffix: &str,
) -> PathBuf {
    let relative = input.strip_prefix(input_root).unwrap_or(input);
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".into());
    let file_name = format!("{stem}{suffix}.wav");

    match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            output_root.join(parent).join(file_name)
        }
        _ => output_root.join(file_name),
    }
}
