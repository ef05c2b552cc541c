//! Frequency-response evaluation
//!
//! Pointwise z-transform evaluation of a rational transfer function on the
//! unit circle. Used by the crate's own acceptance tests and by callers
//! that want to inspect a designed filter without running samples through
//! it. No plotting, no FFT.

use num_complex::Complex64;
use num_traits::Zero;
use std::f64::consts::TAU;

/// Evaluate `Σ coeffs[k]·z⁻ᵏ` at `z = e^{jw}`.
fn polynomial_at(coeffs: &[f64], w: f64) -> Complex64 {
    let mut acc = Complex64::zero();
    for (k, &c) in coeffs.iter().enumerate() {
        acc += Complex64::new(0.0, -(k as f64) * w).exp() * c;
    }
    acc
}

/// Magnitude of `H(e^{jw})` for the transfer function `b(z)/a(z)` at the
/// given frequency in Hz.
///
/// Coefficients may be raw or normalized; the ratio is unaffected by a
/// common scale factor.
pub fn magnitude_at(b: &[f64], a: &[f64], frequency: f64, samplerate: f64) -> f64 {
    let w = TAU * frequency / samplerate;
    polynomial_at(b, w).norm() / polynomial_at(a, w).norm()
}

/// [`magnitude_at`] expressed in decibels.
pub fn magnitude_db_at(b: &[f64], a: &[f64], frequency: f64, samplerate: f64) -> f64 {
    20.0 * magnitude_at(b, a, frequency, samplerate).log10()
}
