pub mod decode;
pub mod resample;

pub use decode::{decode_audio, AudioData};
pub use resample::apply_speed;
