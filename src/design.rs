//! Coefficient Design
//!
//! Second-order recursive-filter coefficients matching classic analog
//! prototypes, computed with the bilinear-transform design equations from
//! the Audio EQ Cookbook.
//! Reference: https://www.w3.org/TR/audio-eq-cookbook/
//!
//! Every `make_*` function is pure and returns the RAW coefficient set;
//! normalization by `a0` happens inside [`IirFilter::set_coefficients`],
//! not here.

use crate::engine::IirFilter;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, TAU};

/// Default Q for low-pass, high-pass, all-pass and peak designs
/// (maximally flat Butterworth response).
pub const BUTTERWORTH_Q: f64 = FRAC_1_SQRT_2;

/// Default Q for band-pass designs.
pub const BANDPASS_Q: f64 = 1.0;

/// Default Q for shelf designs, equivalent to a shelf slope of 1.
pub const SHELF_Q: f64 = 1.0;

/// Raw second-order coefficient set.
///
/// Transfer function: `H(z) = (b0 + b1·z⁻¹ + b2·z⁻²) / (a0 + a1·z⁻¹ + a2·z⁻²)`.
/// Coefficients are stored exactly as designed, un-normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiquadCoeffs {
    /// Numerator (feedforward) coefficients `[b0, b1, b2]`
    pub b: [f64; 3],
    /// Denominator (feedback) coefficients `[a0, a1, a2]`
    pub a: [f64; 3],
}

impl BiquadCoeffs {
    /// Construct an order-2 [`IirFilter`] configured with this set.
    ///
    /// The engine normalizes by `a0` during assignment.
    pub fn build(&self) -> Result<IirFilter> {
        let mut filter = IirFilter::new(2)?;
        filter.set_coefficients(&self.a, &self.b)?;
        Ok(filter)
    }
}

/// Shared intermediates of the cookbook equations, computed once per design:
/// `(cos w0, sin w0, alpha)` for `w0 = 2π·frequency/samplerate`.
fn design_vars(frequency: f64, samplerate: f64, q_factor: f64) -> (f64, f64, f64) {
    let w0 = TAU * frequency / samplerate;
    let cos0 = w0.cos();
    let sin0 = w0.sin();
    (cos0, sin0, sin0 / (2.0 * q_factor))
}

/// Shelf/peak amplitude from a dB gain: `A = 10^(gain_db/40)`.
fn amplitude(gain_db: f64) -> f64 {
    10f64.powf(gain_db / 40.0)
}

/// Second-order Butterworth low-pass at the default Q of 1/√2.
pub fn make_lowpass(frequency: f64, samplerate: f64) -> BiquadCoeffs {
    make_lowpass_with_q(frequency, samplerate, BUTTERWORTH_Q)
}

/// Second-order low-pass with an explicit Q factor.
pub fn make_lowpass_with_q(frequency: f64, samplerate: f64, q_factor: f64) -> BiquadCoeffs {
    let (cos0, _sin0, alpha) = design_vars(frequency, samplerate, q_factor);

    let b0 = (1.0 - cos0) / 2.0;
    BiquadCoeffs {
        b: [b0, 1.0 - cos0, b0],
        a: [1.0 + alpha, -2.0 * cos0, 1.0 - alpha],
    }
}

/// Second-order Butterworth high-pass at the default Q of 1/√2.
pub fn make_highpass(frequency: f64, samplerate: f64) -> BiquadCoeffs {
    make_highpass_with_q(frequency, samplerate, BUTTERWORTH_Q)
}

/// Second-order high-pass with an explicit Q factor.
pub fn make_highpass_with_q(frequency: f64, samplerate: f64, q_factor: f64) -> BiquadCoeffs {
    let (cos0, _sin0, alpha) = design_vars(frequency, samplerate, q_factor);

    let b0 = (1.0 + cos0) / 2.0;
    BiquadCoeffs {
        b: [b0, -(1.0 + cos0), b0],
        a: [1.0 + alpha, -2.0 * cos0, 1.0 - alpha],
    }
}

/// Second-order band-pass (0 dB peak gain) at the default Q of 1.
pub fn make_bandpass(frequency: f64, samplerate: f64) -> BiquadCoeffs {
    make_bandpass_with_q(frequency, samplerate, BANDPASS_Q)
}

/// Second-order band-pass with an explicit Q factor.
pub fn make_bandpass_with_q(frequency: f64, samplerate: f64, q_factor: f64) -> BiquadCoeffs {
    let (cos0, _sin0, alpha) = design_vars(frequency, samplerate, q_factor);

    BiquadCoeffs {
        b: [alpha, 0.0, -alpha],
        a: [1.0 + alpha, -2.0 * cos0, 1.0 - alpha],
    }
}

/// Second-order all-pass at the default Q of 1/√2.
///
/// Unity magnitude at every frequency; only the phase response varies.
pub fn make_allpass(frequency: f64, samplerate: f64) -> BiquadCoeffs {
    make_allpass_with_q(frequency, samplerate, BUTTERWORTH_Q)
}

/// Second-order all-pass with an explicit Q factor.
pub fn make_allpass_with_q(frequency: f64, samplerate: f64, q_factor: f64) -> BiquadCoeffs {
    let (cos0, _sin0, alpha) = design_vars(frequency, samplerate, q_factor);

    BiquadCoeffs {
        b: [1.0 - alpha, -2.0 * cos0, 1.0 + alpha],
        a: [1.0 + alpha, -2.0 * cos0, 1.0 - alpha],
    }
}

/// Peak (bell) filter boosting or cutting `gain_db` around the center
/// frequency, at the default Q of 1/√2.
pub fn make_peak(frequency: f64, samplerate: f64, gain_db: f64) -> BiquadCoeffs {
    make_peak_with_q(frequency, samplerate, gain_db, BUTTERWORTH_Q)
}

/// Peak (bell) filter with an explicit Q factor.
pub fn make_peak_with_q(
    frequency: f64,
    samplerate: f64,
    gain_db: f64,
    q_factor: f64,
) -> BiquadCoeffs {
    let (cos0, _sin0, alpha) = design_vars(frequency, samplerate, q_factor);
    let big_a = amplitude(gain_db);

    BiquadCoeffs {
        b: [1.0 + alpha * big_a, -2.0 * cos0, 1.0 - alpha * big_a],
        a: [1.0 + alpha / big_a, -2.0 * cos0, 1.0 - alpha / big_a],
    }
}

/// Low shelf boosting or cutting everything below the corner frequency by
/// `gain_db`, at the default shelf slope (Q = 1).
pub fn make_lowshelf(frequency: f64, samplerate: f64, gain_db: f64) -> BiquadCoeffs {
    make_lowshelf_with_q(frequency, samplerate, gain_db, SHELF_Q)
}

/// Low shelf with an explicit Q factor.
pub fn make_lowshelf_with_q(
    frequency: f64,
    samplerate: f64,
    gain_db: f64,
    q_factor: f64,
) -> BiquadCoeffs {
    let (cos0, _sin0, alpha) = design_vars(frequency, samplerate, q_factor);
    let big_a = amplitude(gain_db);
    let two_sqrt_a_alpha = 2.0 * big_a.sqrt() * alpha;

    BiquadCoeffs {
        b: [
            big_a * ((big_a + 1.0) - (big_a - 1.0) * cos0 + two_sqrt_a_alpha),
            2.0 * big_a * ((big_a - 1.0) - (big_a + 1.0) * cos0),
            big_a * ((big_a + 1.0) - (big_a - 1.0) * cos0 - two_sqrt_a_alpha),
        ],
        a: [
            (big_a + 1.0) + (big_a - 1.0) * cos0 + two_sqrt_a_alpha,
            -2.0 * ((big_a - 1.0) + (big_a + 1.0) * cos0),
            (big_a + 1.0) + (big_a - 1.0) * cos0 - two_sqrt_a_alpha,
        ],
    }
}

/// High shelf boosting or cutting everything above the corner frequency by
/// `gain_db`, at the default shelf slope (Q = 1).
pub fn make_highshelf(frequency: f64, samplerate: f64, gain_db: f64) -> BiquadCoeffs {
    make_highshelf_with_q(frequency, samplerate, gain_db, SHELF_Q)
}

/// High shelf with an explicit Q factor.
pub fn make_highshelf_with_q(
    frequency: f64,
    samplerate: f64,
    gain_db: f64,
    q_factor: f64,
) -> BiquadCoeffs {
    let (cos0, _sin0, alpha) = design_vars(frequency, samplerate, q_factor);
    let big_a = amplitude(gain_db);
    let two_sqrt_a_alpha = 2.0 * big_a.sqrt() * alpha;

    BiquadCoeffs {
        b: [
            big_a * ((big_a + 1.0) + (big_a - 1.0) * cos0 + two_sqrt_a_alpha),
            -2.0 * big_a * ((big_a - 1.0) + (big_a + 1.0) * cos0),
            big_a * ((big_a + 1.0) + (big_a - 1.0) * cos0 - two_sqrt_a_alpha),
        ],
        a: [
            (big_a + 1.0) - (big_a - 1.0) * cos0 + two_sqrt_a_alpha,
            2.0 * ((big_a - 1.0) - (big_a + 1.0) * cos0),
            (big_a + 1.0) - (big_a - 1.0) * cos0 - two_sqrt_a_alpha,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{magnitude_at, magnitude_db_at};
    use approx::assert_relative_eq;
    use test_case::test_case;

    const SR: f64 = 44100.0;

    #[test]
    fn test_lowpass_butterworth_cutoff() {
        // At Q = 1/√2 the digital cookbook low-pass hits exactly |H| = Q
        // at the cutoff frequency, the nominal -3 dB point.
        let coeffs = make_lowpass(1000.0, SR);
        let dc = magnitude_at(&coeffs.b, &coeffs.a, 0.0, SR);
        let at_cutoff = magnitude_at(&coeffs.b, &coeffs.a, 1000.0, SR);

        assert_relative_eq!(dc, 1.0, epsilon = 1e-12);
        assert_relative_eq!(at_cutoff, BUTTERWORTH_Q, epsilon = 1e-12);

        // Attenuation relative to DC is no more than 3 dB at the cutoff.
        let rel_db = 20.0 * (at_cutoff / dc).log10();
        assert!(rel_db >= -3.02, "cutoff attenuation {rel_db} dB");
    }

    #[test]
    fn test_lowpass_attenuates_above_cutoff() {
        let coeffs = make_lowpass(1000.0, SR);
        let at_8k = magnitude_db_at(&coeffs.b, &coeffs.a, 8000.0, SR);
        assert!(at_8k < -30.0, "expected strong stopband cut, got {at_8k} dB");
    }

    #[test]
    fn test_highpass_mirror_response() {
        let coeffs = make_highpass(1000.0, SR);
        let at_cutoff = magnitude_at(&coeffs.b, &coeffs.a, 1000.0, SR);
        let near_dc = magnitude_db_at(&coeffs.b, &coeffs.a, 50.0, SR);

        assert_relative_eq!(at_cutoff, BUTTERWORTH_Q, epsilon = 1e-12);
        assert!(near_dc < -40.0, "expected subsonic cut, got {near_dc} dB");
    }

    #[test]
    fn test_bandpass_unity_peak() {
        let coeffs = make_bandpass(2000.0, SR);
        let at_center = magnitude_at(&coeffs.b, &coeffs.a, 2000.0, SR);
        assert_relative_eq!(at_center, 1.0, epsilon = 1e-9);

        let off_center = magnitude_db_at(&coeffs.b, &coeffs.a, 200.0, SR);
        assert!(off_center < -15.0);
    }

    #[test_case(100.0)]
    #[test_case(1000.0)]
    #[test_case(10000.0)]
    fn test_allpass_unity_magnitude_everywhere(probe_hz: f64) {
        let coeffs = make_allpass(1000.0, SR);
        let mag = magnitude_at(&coeffs.b, &coeffs.a, probe_hz, SR);
        assert_relative_eq!(mag, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_peak_gain_at_center() {
        let coeffs = make_peak_with_q(1000.0, SR, 6.0, 1.414);
        let db = magnitude_db_at(&coeffs.b, &coeffs.a, 1000.0, SR);
        assert!((db - 6.0).abs() < 0.1, "expected +6 dB at center, got {db}");
    }

    #[test]
    fn test_peak_cut_at_center() {
        let coeffs = make_peak(500.0, SR, -9.0);
        let db = magnitude_db_at(&coeffs.b, &coeffs.a, 500.0, SR);
        assert!((db + 9.0).abs() < 0.1, "expected -9 dB at center, got {db}");
    }

    #[test_case(6.0 ; "boost_6_db")]
    #[test_case(-6.0 ; "cut_6_db")]
    fn test_lowshelf_gain_at_dc(gain_db: f64) {
        let coeffs = make_lowshelf(800.0, SR, gain_db);
        let db = magnitude_db_at(&coeffs.b, &coeffs.a, 0.0, SR);
        assert_relative_eq!(db, gain_db, epsilon = 1e-9);
    }

    #[test_case(6.0 ; "boost_6_db")]
    #[test_case(-6.0 ; "cut_6_db")]
    fn test_highshelf_gain_at_nyquist(gain_db: f64) {
        let coeffs = make_highshelf(4000.0, SR, gain_db);
        let db = magnitude_db_at(&coeffs.b, &coeffs.a, SR / 2.0, SR);
        assert_relative_eq!(db, gain_db, epsilon = 1e-9);
    }

    #[test]
    fn test_design_returns_raw_coefficients() {
        // a0 = 1 + alpha, not yet normalized to 1.
        let coeffs = make_lowpass(1000.0, SR);
        assert!(coeffs.a[0] > 1.0);
    }

    #[test]
    fn test_build_normalizes() {
        let filter = make_lowpass(1000.0, SR).build().unwrap();
        assert_eq!(filter.order(), 2);
        assert_eq!(filter.a_coeffs()[0], 1.0);
    }

    #[test]
    fn test_lowpass_impulse_response_matches_evaluation() {
        // Drive the engine with a unit impulse and check the first samples
        // against the normalized difference equation by hand.
        let coeffs = make_lowpass(1000.0, SR);
        let mut filter = coeffs.build().unwrap();
        let out = filter.process_block(&[1.0, 0.0, 0.0]);

        let a0 = coeffs.a[0];
        let b = [coeffs.b[0] / a0, coeffs.b[1] / a0, coeffs.b[2] / a0];
        let a = [1.0, coeffs.a[1] / a0, coeffs.a[2] / a0];

        assert_relative_eq!(out[0], b[0], epsilon = 1e-12);
        assert_relative_eq!(out[1], b[1] - a[1] * out[0], epsilon = 1e-12);
        assert_relative_eq!(
            out[2],
            b[2] - a[1] * out[1] - a[2] * out[0],
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_coeffs_serde_roundtrip() {
        let coeffs = make_peak(1000.0, SR, 3.0);
        let json = serde_json::to_string(&coeffs).unwrap();
        let back: BiquadCoeffs = serde_json::from_str(&json).unwrap();
        assert_eq!(coeffs, back);
    }
}
