use std::path::Path;

use crate::audio::AudioData;
use crate::error::{Error, Result};

/// Write interleaved float samples as 16-bit PCM WAV.
///
/// Output files always use integer PCM regardless of what the input was
/// decoded from, matching what downstream players expect of a `.wav`.
pub fn write(path: &Path, audio: &AudioData) -> Result<()> {
    if audio.channels == 0 {
        return Err(Error::Encode {
            path: path.to_path_buf(),
            reason: "stream has no channels".into(),
        });
    }

    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let encode_err = |e: hound::Error| Error::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(encode_err)?;
    for &sample in &audio.samples {
        writer.write_sample(quantize(sample)).map_err(encode_err)?;
    }
    writer.finalize().map_err(encode_err)?;

    log::debug!(
        "wrote {} ({} frames, {} ch, {} Hz)",
        path.display(),
        audio.frames(),
        audio.channels,
        audio.sample_rate
    );
    Ok(())
}

/// Move a finished scratch file onto its final path.
///
/// A rename within one filesystem is atomic, so readers of `output` see
/// either the previous file or the complete new one, never a partial write.
pub fn promote(scratch: &Path, output: &Path) -> Result<()> {
    std::fs::rename(scratch, output).map_err(|e| Error::Encode {
        path: output.to_path_buf(),
        reason: format!("could not promote {}: {}", scratch.display(), e),
    })
}

/// Scale a float sample to 16-bit, saturating outside [-1.0, 1.0].
fn quantize(sample: f32) -> i16 {
    (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
