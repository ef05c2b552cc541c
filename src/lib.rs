//! filterkit - Recursive Digital Filter Toolkit
//!
//! Filterkit derives second-order recursive-filter coefficients matching
//! classic analog responses (Butterworth low/high/band/all-pass, peaking,
//! shelving) from the bilinear-transform cookbook equations, and runs them
//! through a general-purpose order-N IIR engine.
//!
//! # Architecture
//!
//! - [`design`]: pure coefficient-design functions producing raw
//!   [`BiquadCoeffs`](design::BiquadCoeffs)
//! - [`engine`]: the stateful Direct Form I [`IirFilter`]
//! - [`loudness`]: the two-stage [`EqualLoudnessFilter`] cascade, with its
//!   injected curve-data and coefficient-solver collaborators
//! - [`response`]: pointwise frequency-response evaluation
//!
//! Processing is synchronous and single-threaded per instance; independent
//! instances share no state and may be driven from separate threads.

pub mod design;
pub mod engine;
pub mod error;
pub mod loudness;
pub mod response;

pub use design::{
    make_allpass, make_allpass_with_q, make_bandpass, make_bandpass_with_q, make_highpass,
    make_highpass_with_q, make_highshelf, make_highshelf_with_q, make_lowpass,
    make_lowpass_with_q, make_lowshelf, make_lowshelf_with_q, make_peak, make_peak_with_q,
    BiquadCoeffs,
};
pub use engine::IirFilter;
pub use error::{FilterError, Result};
pub use loudness::{CoefficientSolver, EqualLoudnessFilter, LoudnessCurve, SolvedCoefficients};

/// Anything that transforms an ordered sequence of samples into an ordered
/// sequence of samples, one at a time, preserving length and order.
///
/// Implemented by [`IirFilter`] and [`EqualLoudnessFilter`]; boundary code
/// (demos, response sweeps) can drive either through this seam.
pub trait Filter {
    /// Process a single sample.
    fn process(&mut self, sample: f64) -> f64;

    /// Process a block of samples, preserving state across elements.
    fn process_block(&mut self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.process(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_trait_objects() {
        let mut filters: Vec<Box<dyn Filter>> = vec![
            Box::new(IirFilter::new(2).unwrap()),
            Box::new(make_lowpass(1000.0, 44100.0).build().unwrap()),
        ];

        let input = [1.0, 0.5, -0.5];
        for filter in &mut filters {
            let out = filter.process_block(&input);
            assert_eq!(out.len(), input.len());
        }
    }

    #[test]
    fn test_trait_block_matches_inherent_block() {
        let coeffs = make_peak(2000.0, 48000.0, 3.0);
        let mut via_trait = coeffs.build().unwrap();
        let mut via_inherent = coeffs.build().unwrap();

        let input: Vec<f64> = (0..64).map(|i| (i as f64 * 0.2).sin()).collect();
        let trait_out = Filter::process_block(&mut via_trait, &input);
        let inherent_out = via_inherent.process_block(&input);
        assert_eq!(trait_out, inherent_out);
    }
}
