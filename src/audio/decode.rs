use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Error, Result};

/// Decoded audio: interleaved f32 samples in [-1, 1] plus the stream layout.
///
/// The channel layout is preserved so the conversion path can write output
/// with the same channels it read; analysis works on [`AudioData::to_mono`].
#[derive(Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / self.sample_rate as f64
        }
    }

    /// Downmix to mono by averaging each frame's channels.
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }
        let channels = self.channels as usize;
        self.samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }
}

/// Decode the entire file into memory.
///
/// Supports every container/codec the enabled symphonia features cover
/// (WAV, MP3, FLAC, AAC/M4A). Any probe, track, or fatal decode problem
/// surfaces as [`Error::Decode`] for that path.
pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let decode_err = |reason: String| Error::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|e| decode_err(e.to_string()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| decode_err(format!("unrecognized format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| decode_err("no audio tracks found".into()))?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count()) as u16;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| decode_err("unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_err(format!("no decoder for codec: {}", e)))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(decode_err(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Recoverable bitstream glitch; skip the packet.
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(decode_err(e.to_string())),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        all_samples.extend_from_slice(sample_buf.samples());
    }

    if all_samples.is_empty() {
        return Err(decode_err("stream contained no decodable audio".into()));
    }

    let data = AudioData {
        samples: all_samples,
        sample_rate,
        channels,
    };

    log::debug!(
        "Decoded {}: {} frames, {} ch, {}Hz, {:.1}s",
        path.display(),
        data.frames(),
        data.channels,
        data.sample_rate,
        data.duration_secs()
    );

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_mix_averages_frames() {
        let data = AudioData {
            samples: vec![1.0, -1.0, 0.5, 0.5, 0.0, 1.0],
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(data.to_mono(), vec![0.0, 0.5, 0.5]);
        assert_eq!(data.frames(), 3);
    }

    #[test]
    fn mono_mix_of_mono_is_identity() {
        let data = AudioData {
            samples: vec![0.25, -0.25, 0.75],
            sample_rate: 48000,
            channels: 1,
        };
        assert_eq!(data.to_mono(), data.samples);
    }

    #[test]
    fn decode_of_missing_file_is_typed() {
        let err = decode_audio(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
