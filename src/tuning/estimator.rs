use rustfft::{num_complex::Complex, FftPlanner};

/// Inclusive frequency window used to isolate tuning-relevant content.
///
/// Wide enough to capture the reference pitch and its near neighbors, narrow
/// enough to reject unrelated spectral energy elsewhere in the mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureBand {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl CaptureBand {
    pub fn contains(&self, freq: f64) -> bool {
        freq >= self.low_hz && freq <= self.high_hz
    }
}

impl Default for CaptureBand {
    fn default() -> Self {
        Self {
            low_hz: 400.0,
            high_hz: 500.0,
        }
    }
}

/// Result of one tuning analysis. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningReport {
    /// Magnitude-weighted centroid of the capture band, in Hz.
    pub dominant_hz: f64,
    pub sample_rate: u32,
    pub duration_secs: f64,
    /// Frequencies of the strongest capture-band bins, descending magnitude,
    /// at most five entries. Ties keep original bin order.
    pub harmonics: Vec<f64>,
}

/// How many of the strongest bins the report lists.
const HARMONIC_COUNT: usize = 5;

/// Estimate the dominant tuning frequency of a mono buffer.
///
/// Runs a single forward FFT over the whole buffer, keeps the
/// non-negative half-spectrum bins that fall inside `band`, and returns the
/// magnitude-weighted mean of their frequencies. A weighted centroid is robust
/// to a single noisy bin where a plain argmax is not.
///
/// Returns `None` when no bin falls inside the band (buffer too short for the
/// band's resolution, or empty) or when the in-band magnitude mass is zero
/// (digital silence). Callers must treat `None` as "tuning unknown", never as
/// a zero frequency.
pub fn analyze(samples: &[f32], sample_rate: u32, band: &CaptureBand) -> Option<TuningReport> {
    if samples.is_empty() || sample_rate == 0 {
        return None;
    }

    let len = samples.len();
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(len);

    let mut buffer: Vec<Complex<f32>> =
        samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    let hz_per_bin = sample_rate as f64 / len as f64;
    let half = len / 2;

    // Accumulate in f64: the band can hold thousands of bins for long
    // recordings and the centroid must not drift with buffer length.
    let mut weighted_sum = 0.0f64;
    let mut magnitude_sum = 0.0f64;
    let mut in_band: Vec<(f64, f64)> = Vec::new();

    for (i, value) in buffer[..=half].iter().enumerate() {
        let freq = i as f64 * hz_per_bin;
        if freq < band.low_hz {
            continue;
        }
        if freq > band.high_hz {
            break;
        }
        let magnitude = value.norm() as f64;
        weighted_sum += freq * magnitude;
        magnitude_sum += magnitude;
        in_band.push((freq, magnitude));
    }

    if in_band.is_empty() || magnitude_sum <= 0.0 {
        return None;
    }

    let dominant_hz = weighted_sum / magnitude_sum;
    if !dominant_hz.is_finite() {
        return None;
    }

    // Stable sort: equal magnitudes keep ascending bin order.
    in_band.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    let harmonics: Vec<f64> = in_band
        .iter()
        .take(HARMONIC_COUNT)
        .map(|&(freq, _)| freq)
        .collect();

    Some(TuningReport {
        dominant_hz,
        sample_rate,
        duration_secs: len as f64 / sample_rate as f64,
        harmonics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44100;

    fn tone(freq: f64, amplitude: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f64 / RATE as f64;
                (2.0 * std::f64::consts::PI * freq * t).sin() as f32 * amplitude
            })
            .collect()
    }

    fn mix(parts: &[Vec<f32>]) -> Vec<f32> {
        let n = parts[0].len();
        (0..n).map(|i| parts.iter().map(|p| p[i]).sum()).collect()
    }

    #[test]
    fn silence_has_no_report() {
        let silence = vec![0.0; 2 * RATE as usize];
        assert!(analyze(&silence, RATE, &CaptureBand::default()).is_none());
    }

    #[test]
    fn empty_buffer_has_no_report() {
        assert!(analyze(&[], RATE, &CaptureBand::default()).is_none());
        assert!(analyze(&[0.5; 100], 0, &CaptureBand::default()).is_none());
    }

    #[test]
    fn band_without_bins_has_no_report() {
        // 80 samples at 44.1kHz puts bins at 0, 551.25, 1102.5, ... Hz:
        // nothing falls inside [400, 500] no matter how loud the signal is.
        let samples = tone(551.25, 1.0, 80);
        assert!(analyze(&samples, RATE, &CaptureBand::default()).is_none());
    }

    #[test]
    fn pure_tone_centroid_matches_tone() {
        // 446 Hz over 2s is bin-exact (892 cycles), so leakage is negligible.
        let samples = tone(446.0, 0.8, 2 * RATE as usize);
        let report = analyze(&samples, RATE, &CaptureBand::default()).unwrap();

        assert!(
            (report.dominant_hz - 446.0).abs() < 0.5,
            "dominant {} should be ~446",
            report.dominant_hz
        );
        assert!((report.harmonics[0] - 446.0).abs() < 0.5);
        assert_eq!(report.sample_rate, RATE);
        assert!((report.duration_secs - 2.0).abs() < 1e-9);
    }

    #[test]
    fn single_bin_band_reports_exactly_that_bin() {
        // 320 samples at 44.1kHz: bin spacing 137.8125 Hz, and bin 3
        // (413.4375 Hz) is the only one inside the default band. With all
        // in-band energy in one bin the centroid is that bin's frequency and
        // the harmonics list collapses to it alone.
        let freq = 3.0 * RATE as f64 / 320.0;
        let samples = tone(freq, 1.0, 320);
        let report = analyze(&samples, RATE, &CaptureBand::default()).unwrap();

        assert!((report.dominant_hz - freq).abs() < 1e-6);
        assert_eq!(report.harmonics.len(), 1);
        assert_eq!(report.harmonics[0], freq);
    }

    #[test]
    fn centroid_weights_by_magnitude() {
        let n = 2 * RATE as usize;
        // Equal amplitudes: centroid sits halfway between the tones.
        let even = mix(&[tone(420.0, 0.4, n), tone(450.0, 0.4, n)]);
        let report = analyze(&even, RATE, &CaptureBand::default()).unwrap();
        assert!(
            (report.dominant_hz - 435.0).abs() < 0.5,
            "dominant {} should be ~435",
            report.dominant_hz
        );

        // 3:1 amplitudes pull the centroid toward the louder tone.
        let skewed = mix(&[tone(420.0, 0.6, n), tone(450.0, 0.2, n)]);
        let report = analyze(&skewed, RATE, &CaptureBand::default()).unwrap();
        assert!(
            (report.dominant_hz - 427.5).abs() < 0.5,
            "dominant {} should be ~427.5",
            report.dominant_hz
        );
    }

    #[test]
    fn harmonics_rank_by_descending_magnitude() {
        let n = 2 * RATE as usize;
        let samples = mix(&[
            tone(450.0, 0.5, n),
            tone(420.0, 1.0, n),
            tone(480.0, 0.25, n),
        ]);
        let report = analyze(&samples, RATE, &CaptureBand::default()).unwrap();

        assert_eq!(report.harmonics.len(), 5);
        assert!((report.harmonics[0] - 420.0).abs() < 0.01);
        assert!((report.harmonics[1] - 450.0).abs() < 0.01);
        assert!((report.harmonics[2] - 480.0).abs() < 0.01);
    }

    #[test]
    fn custom_band_filters_content() {
        let n = RATE as usize;
        let samples = tone(900.0, 0.7, n);
        let wide = CaptureBand {
            low_hz: 800.0,
            high_hz: 1000.0,
        };
        let report = analyze(&samples, RATE, &wide).unwrap();
        assert!((report.dominant_hz - 900.0).abs() < 0.5);

        // Band edges are inclusive.
        assert!(wide.contains(800.0));
        assert!(wide.contains(1000.0));
        assert!(!wide.contains(1000.01));
    }
}
