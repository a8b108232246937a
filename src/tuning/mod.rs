pub mod corrector;
pub mod estimator;

pub use corrector::{correct, Correction, CorrectionParams};
pub use estimator::{analyze, CaptureBand, TuningReport};
