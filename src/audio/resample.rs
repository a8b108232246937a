use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::{Error, Result};

/// Change playback speed by `speed`, coupling pitch and duration.
///
/// The input is treated as if it had been captured at `rate * speed` and is
/// rendered back at the original rate: every frequency in the signal is
/// multiplied by `speed` and the duration by `1 / speed`. The sample rate of
/// the result is unchanged, which is why it never appears in the signature.
///
/// Returns a fresh buffer; the input is never aliased or mutated.
pub fn apply_speed(samples: &[f32], channels: u16, speed: f64) -> Result<Vec<f32>> {
    if !(speed.is_finite() && speed > 0.0) {
        return Err(Error::Resample(format!("invalid speed ratio {}", speed)));
    }
    if channels == 0 {
        return Err(Error::Resample("zero channels".into()));
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }
    if speed == 1.0 {
        log::debug!("Speed ratio is 1.0, skipping resample");
        return Ok(samples.to_vec());
    }

    // Rendering frames captured at rate*speed back at rate is a plain rate
    // conversion with ratio out/in = 1/speed.
    let ratio = 1.0 / speed;

    let planar_input = deinterleave(samples, channels);
    let input_frames = planar_input[0].len();

    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0, // fixed ratio, no runtime adjustment
        PolynomialDegree::Septic,
        input_frames,
        channels as usize,
    )
    .map_err(|e| Error::Resample(e.to_string()))?;

    let planar_output = resampler
        .process(&planar_input, None)
        .map_err(|e| Error::Resample(e.to_string()))?;

    let output = interleave(planar_output);

    log::debug!(
        "Applied speed ratio {:.6}: {} -> {} frames",
        speed,
        input_frames,
        output.len() / channels as usize
    );

    Ok(output)
}

/// Convert interleaved samples to planar format.
///
/// Input:  [L, R, L, R, ...]
/// Output: [[L, L, ...], [R, R, ...]]
fn deinterleave(samples: &[f32], channels: u16) -> Vec<Vec<f32>> {
    let num_channels = channels as usize;
    let num_frames = samples.len() / num_channels;

    let mut planar = vec![Vec::with_capacity(num_frames); num_channels];
    for frame in samples.chunks_exact(num_channels) {
        for (ch, &sample) in frame.iter().enumerate() {
            planar[ch].push(sample);
        }
    }
    planar
}

/// Convert planar samples back to interleaved format.
fn interleave(planar: Vec<Vec<f32>>) -> Vec<f32> {
    if planar.is_empty() {
        return Vec::new();
    }

    let num_channels = planar.len();
    let num_frames = planar[0].len();
    let mut interleaved = Vec::with_capacity(num_frames * num_channels);

    for frame_idx in 0..num_frames {
        for channel in &planar {
            interleaved.push(channel[frame_idx]);
        }
    }
    interleaved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, secs: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * freq * t).sin() * 0.5
            })
            .collect()
    }

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count()
    }

    #[test]
    fn deinterleave_splits_channels() {
        let interleaved = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let planar = deinterleave(&interleaved, 2);
        assert_eq!(planar.len(), 2);
        assert_eq!(planar[0], vec![1.0, 3.0, 5.0]);
        assert_eq!(planar[1], vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn interleave_restores_order() {
        let planar = vec![vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]];
        assert_eq!(interleave(planar), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn unit_speed_is_passthrough() {
        let input = vec![0.1, 0.2, 0.3, 0.4];
        let output = apply_speed(&input, 2, 1.0).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(apply_speed(&[], 1, 0.98).unwrap().is_empty());
    }

    #[test]
    fn invalid_speed_is_rejected() {
        assert!(apply_speed(&[0.0; 16], 1, 0.0).is_err());
        assert!(apply_speed(&[0.0; 16], 1, f64::NAN).is_err());
    }

    #[test]
    fn slowdown_lengthens_output() {
        let input = sine(440.0, 44100, 1.0);
        let speed = 432.0 / 440.0;
        let output = apply_speed(&input, 1, speed).unwrap();

        let expected = (input.len() as f64 / speed) as usize;
        assert!(
            output.len() >= expected - 10 && output.len() <= expected + 10,
            "expected ~{} samples, got {}",
            expected,
            output.len()
        );
    }

    #[test]
    fn slowdown_lowers_pitch() {
        let sample_rate = 44100;
        let input = sine(440.0, sample_rate, 1.0);
        let output = apply_speed(&input, 1, 0.5).unwrap();

        // A tone at f has ~2*f sign changes per second.
        let in_rate = zero_crossings(&input) as f64 * sample_rate as f64 / input.len() as f64;
        let out_rate = zero_crossings(&output) as f64 * sample_rate as f64 / output.len() as f64;
        assert!(
            (out_rate / in_rate - 0.5).abs() < 0.02,
            "pitch ratio {} should be ~0.5",
            out_rate / in_rate
        );
    }
}
