use serde::Deserialize;
use std::path::Path;

use crate::tuning::{CaptureBand, CorrectionParams};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tuning: TuningConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct TuningConfig {
    #[serde(default = "default_target_hz")]
    pub target_hz: f64,
    #[serde(default = "default_tolerance_hz")]
    pub tolerance_hz: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_band_low_hz")]
    pub band_low_hz: f64,
    #[serde(default = "default_band_high_hz")]
    pub band_high_hz: f64,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default)]
    pub keep_scratch: bool,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            target_hz: default_target_hz(),
            tolerance_hz: default_tolerance_hz(),
            max_iterations: default_max_iterations(),
            band_low_hz: default_band_low_hz(),
            band_high_hz: default_band_high_hz(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            keep_scratch: false,
        }
    }
}

impl Config {
    pub fn capture_band(&self) -> CaptureBand {
        CaptureBand {
            low_hz: self.tuning.band_low_hz,
            high_hz: self.tuning.band_high_hz,
        }
    }

    pub fn correction_params(&self) -> CorrectionParams {
        CorrectionParams {
            target_hz: self.tuning.target_hz,
            tolerance_hz: self.tuning.tolerance_hz,
            max_iterations: self.tuning.max_iterations,
            band: self.capture_band(),
            keep_scratch: self.output.keep_scratch,
        }
    }
}

fn default_target_hz() -> f64 { 432.0 }
fn default_tolerance_hz() -> f64 { 0.5 }
fn default_max_iterations() -> usize { 3 }
fn default_band_low_hz() -> f64 { 400.0 }
fn default_band_high_hz() -> f64 { 500.0 }
fn default_suffix() -> String { "_432Hz".into() }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("ignoring malformed config {}: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_builtin_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tuning.target_hz, 432.0);
        assert_eq!(config.tuning.tolerance_hz, 0.5);
        assert_eq!(config.tuning.max_iterations, 3);
        assert_eq!(config.output.suffix, "_432Hz");
        assert!(!config.output.keep_scratch);
    }

    #[test]
    fn partial_section_fills_missing_fields() {
        let config: Config = toml::from_str(
            r#"
            [tuning]
            target_hz = 440.0

            [output]
            keep_scratch = true
            "#,
        )
        .unwrap();
        assert_eq!(config.tuning.target_hz, 440.0);
        assert_eq!(config.tuning.tolerance_hz, 0.5);
        assert_eq!(config.output.suffix, "_432Hz");
        assert!(config.output.keep_scratch);
    }

    #[test]
    fn correction_params_mirror_the_config() {
        let config: Config = toml::from_str(
            r#"
            [tuning]
            target_hz = 444.0
            tolerance_hz = 1.0
            max_iterations = 5
            band_low_hz = 410.0
            band_high_hz = 490.0
            "#,
        )
        .unwrap();

        let params = config.correction_params();
        assert_eq!(params.target_hz, 444.0);
        assert_eq!(params.tolerance_hz, 1.0);
        assert_eq!(params.max_iterations, 5);
        assert_eq!(params.band.low_hz, 410.0);
        assert_eq!(params.band.high_hz, 490.0);
    }
}
