//! Measure the dominant tuning of audio recordings and resample sharp ones
//! down to A4 = 432 Hz.
//!
//! The engine decodes a file, estimates its dominant frequency as the
//! magnitude-weighted spectral centroid of the 400-500 Hz band, and, when
//! that measurement sits above the target, slows the audio by
//! `target / measured` until a re-measurement lands within tolerance. Pitch
//! and duration change together, as on a slowed-down turntable; nothing is
//! time-stretched.
//!
//! [`tuning::analyze`] is the pure estimator, [`tuning::correct`] retunes a
//! single file, and [`batch::convert_all`] walks a directory tree and
//! mirrors it into converted output.
//!
//! ```
//! use verdi::tuning::{analyze, CaptureBand};
//!
//! let rate = 44100u32;
//! let tone: Vec<f32> = (0..rate)
//!     .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / rate as f64).sin() as f32)
//!     .collect();
//!
//! let report = analyze(&tone, rate, &CaptureBand::default()).unwrap();
//! assert!((report.dominant_hz - 440.0).abs() < 0.5);
//! ```

pub mod audio;
pub mod batch;
pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod tuning;

pub use batch::{convert_all, ConversionOutcome};
pub use error::{Error, Result};
pub use tuning::{analyze, correct, CaptureBand, Correction, CorrectionParams, TuningReport};
