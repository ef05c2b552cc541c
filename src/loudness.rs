//! Equal-Loudness Cascade
//!
//! Compensates for the ear's non-uniform sensitivity across frequency by
//! running two [`IirFilter`] stages in series: a high-order curve-fitting
//! stage matching the inverse of a measured equal-loudness contour, then a
//! gentle second-order high-pass rolling off subsonic rumble.
//!
//! The spectral-fitting algorithm itself is an injected collaborator (see
//! [`CoefficientSolver`]); this module only prepares its inputs and wires
//! its output into the engine.

use crate::design::make_highpass;
use crate::engine::IirFilter;
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default order for the curve-fitting stage. Higher orders track the
/// contour more closely at more cost per sample.
pub const DEFAULT_CURVE_FIT_ORDER: usize = 10;

/// Default cutoff in Hz for the subsonic high-pass stage.
pub const DEFAULT_HIGHPASS_CUTOFF: f64 = 150.0;

/// Gain in dB assigned to the synthetic point added at the Nyquist
/// frequency, forcing the fitted response down at the top of the spectrum.
const NYQUIST_PAD_DB: f64 = 140.0;

/// A measured equal-loudness contour: ascending frequencies in Hz and the
/// sound pressure level in dB required for perceived-equal loudness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoudnessCurve {
    /// Frequency points in Hz, ascending
    pub frequencies: Vec<f64>,
    /// Required SPL in dB at each frequency point
    pub gains: Vec<f64>,
}

impl LoudnessCurve {
    /// The bundled 80-phon equal-loudness contour (ISO 226 family), the
    /// curve the classic loudness-weighting filters are fitted against.
    pub fn iso_equal_loudness() -> Self {
        Self {
            frequencies: vec![
                0.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 200.0, 300.0, 400.0,
                500.0, 600.0, 700.0, 800.0, 900.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0, 3700.0,
                4000.0, 5000.0, 6000.0, 7000.0, 8000.0, 9000.0, 10000.0, 12500.0, 15000.0, 20000.0,
            ],
            gains: vec![
                120.0, 113.0, 103.0, 97.0, 93.0, 91.0, 89.0, 87.0, 86.0, 85.0, 78.0, 76.0, 76.0,
                76.0, 76.0, 77.0, 78.0, 79.5, 80.0, 79.0, 77.0, 74.0, 71.5, 70.0, 70.5, 74.0,
                79.0, 84.0, 86.0, 86.0, 85.0, 95.0, 110.0, 125.0,
            ],
        }
    }

    /// Load a curve from a JSON file of the form
    /// `{"frequencies": [...], "gains": [...]}`.
    ///
    /// This is the file-backed curve-data collaborator; the caller loads
    /// once and may reuse the curve across cascade constructions.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let curve: LoudnessCurve = serde_json::from_str(&data)?;
        curve.validate()?;
        Ok(curve)
    }

    /// Check that the two sequences are non-empty and of equal length.
    pub fn validate(&self) -> Result<()> {
        if self.frequencies.is_empty() || self.frequencies.len() != self.gains.len() {
            return Err(FilterError::CurveMismatch {
                frequencies: self.frequencies.len(),
                gains: self.gains.len(),
            });
        }
        Ok(())
    }
}

/// Coefficients produced by a [`CoefficientSolver`].
///
/// The fields are named because solver libraries disagree on the order in
/// which they return the two sequences, and a silent swap produces a
/// structurally different, potentially unstable filter. An implementor
/// must assign each sequence to the field it actually is.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedCoefficients {
    /// Feedforward coefficients `[b0, b1, ...]`, length `order + 1`
    pub numerator: Vec<f64>,
    /// Feedback coefficients `[a0, a1, ...]`, length `order + 1`
    pub denominator: Vec<f64>,
}

/// External spectral-fitting collaborator (e.g. a Yule–Walker solver).
///
/// Given a target magnitude response sampled at frequencies normalized so
/// that `1.0` is the Nyquist frequency, produces the coefficients of an
/// order-N recursive filter approximating that response.
pub trait CoefficientSolver {
    fn solve(
        &self,
        order: usize,
        normalized_frequencies: &[f64],
        target_magnitudes: &[f64],
    ) -> SolvedCoefficients;
}

/// Two-stage equal-loudness compensation filter.
///
/// Stage order is fixed: every sample passes through the curve-fitting
/// stage first, then the subsonic high-pass. The structure is immutable
/// after construction; only the stages' histories mutate per sample.
#[derive(Debug, Clone)]
pub struct EqualLoudnessFilter {
    curve_fit: IirFilter,
    highpass: IirFilter,
}

impl EqualLoudnessFilter {
    /// Construct with the default curve-fit order (10) and high-pass
    /// cutoff (150 Hz).
    pub fn new(
        samplerate: f64,
        curve: &LoudnessCurve,
        solver: &dyn CoefficientSolver,
    ) -> Result<Self> {
        Self::with_options(
            samplerate,
            curve,
            solver,
            DEFAULT_CURVE_FIT_ORDER,
            DEFAULT_HIGHPASS_CUTOFF,
        )
    }

    /// Construct with an explicit curve-fit order and high-pass cutoff.
    ///
    /// Fails with [`FilterError::InvalidSampleRate`] before any engine is
    /// built if `samplerate <= 0`. The curve is padded with one synthetic
    /// point at the Nyquist frequency, frequencies are normalized so 1.0 is
    /// Nyquist, and gains are inverted and shifted so the contour's minimum
    /// maps to unity; the solver fits that compensation target.
    pub fn with_options(
        samplerate: f64,
        curve: &LoudnessCurve,
        solver: &dyn CoefficientSolver,
        curve_fit_order: usize,
        highpass_cutoff: f64,
    ) -> Result<Self> {
        if samplerate <= 0.0 {
            return Err(FilterError::InvalidSampleRate { samplerate });
        }
        curve.validate()?;

        let nyquist = samplerate / 2.0;
        let mut frequencies: Vec<f64> =
            curve.frequencies.iter().map(|f| f / nyquist).collect();
        frequencies.push(1.0);

        let mut gains = curve.gains.clone();
        gains.push(NYQUIST_PAD_DB);

        // Invert the contour: the frequency the ear needs the most SPL for
        // gets the most attenuation, and the contour minimum sits at 0 dB.
        let min_gain = gains.iter().copied().fold(f64::INFINITY, f64::min);
        let targets: Vec<f64> = gains
            .iter()
            .map(|g| 10f64.powf((min_gain - g) / 20.0))
            .collect();

        let solved = solver.solve(curve_fit_order, &frequencies, &targets);
        let expected = curve_fit_order + 1;
        if solved.numerator.len() != expected || solved.denominator.len() != expected {
            return Err(FilterError::SolverOutput {
                expected,
                got_b: solved.numerator.len(),
                got_a: solved.denominator.len(),
            });
        }

        let mut curve_fit = IirFilter::new(curve_fit_order)?;
        curve_fit.set_coefficients(&solved.denominator, &solved.numerator)?;

        let highpass = make_highpass(highpass_cutoff, samplerate).build()?;

        debug!(
            samplerate,
            curve_fit_order, highpass_cutoff, "equal-loudness cascade constructed"
        );

        Ok(Self {
            curve_fit,
            highpass,
        })
    }

    /// Process one sample through both stages, curve-fit first.
    pub fn process(&mut self, sample: f64) -> f64 {
        let compensated = self.curve_fit.process(sample);
        self.highpass.process(compensated)
    }

    /// Process a block of samples, preserving state across elements.
    pub fn process_block(&mut self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.process(s)).collect()
    }

    /// Clear both stages' histories; coefficients are untouched.
    pub fn clear(&mut self) {
        self.curve_fit.clear();
        self.highpass.clear();
    }
}

impl crate::Filter for EqualLoudnessFilter {
    fn process(&mut self, sample: f64) -> f64 {
        EqualLoudnessFilter::process(self, sample)
    }
}
