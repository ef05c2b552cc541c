//! Recursive Filter Engine
//!
//! An order-N IIR filter evaluated with the Direct Form I structure:
//! separate input and output history buffers feeding the feedforward and
//! feedback sums. Coefficients are normalized by `a[0]` on assignment so
//! the processing loop never divides.

use crate::error::{FilterError, Result};
use tracing::debug;

/// Order-N recursive (IIR) digital filter, Direct Form I.
///
/// A freshly constructed filter is an identity pass-through (`b[0] = 1`,
/// everything else zero) until [`set_coefficients`](Self::set_coefficients)
/// is called. The order is fixed for the lifetime of the instance.
///
/// History buffers are fixed-capacity ring buffers holding the last N
/// inputs and outputs, most-recent-first. An instance is exclusively owned
/// by one caller; it performs no internal locking.
#[derive(Debug, Clone)]
pub struct IirFilter {
    order: usize,
    /// Denominator coefficients, normalized so `a[0] == 1.0`
    a: Vec<f64>,
    /// Numerator coefficients, divided by the original `a[0]`
    b: Vec<f64>,
    /// Last N input samples; `x_hist[(pos + k) % order]` is x[n-1-k]
    x_hist: Vec<f64>,
    /// Last N output samples, same indexing as `x_hist`
    y_hist: Vec<f64>,
    pos: usize,
}

impl IirFilter {
    /// Create a filter of the given order in the identity pass-through state.
    ///
    /// Fails with [`FilterError::InvalidOrder`] if `order < 1`.
    pub fn new(order: usize) -> Result<Self> {
        if order < 1 {
            return Err(FilterError::InvalidOrder { order });
        }

        let mut a = vec![0.0; order + 1];
        let mut b = vec![0.0; order + 1];
        a[0] = 1.0;
        b[0] = 1.0;

        Ok(Self {
            order,
            a,
            b,
            x_hist: vec![0.0; order],
            y_hist: vec![0.0; order],
            pos: 0,
        })
    }

    /// The filter order N, fixed at construction.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Normalized denominator coefficients (`a[0]` is always 1.0).
    pub fn a_coeffs(&self) -> &[f64] {
        &self.a
    }

    /// Normalized numerator coefficients.
    pub fn b_coeffs(&self) -> &[f64] {
        &self.b
    }

    /// Set and normalize the filter coefficients.
    ///
    /// `a` are the denominator coefficients `[a0, a1, ...]`, `b` the
    /// numerator coefficients `[b0, b1, ...]`; both must have length
    /// `order + 1`. Every coefficient is divided by `a[0]` before storage.
    ///
    /// Validation happens before any mutation: on error the previous
    /// coefficients and the history buffers are untouched. A successful
    /// call replaces the coefficients and leaves the histories as they are.
    pub fn set_coefficients(&mut self, a: &[f64], b: &[f64]) -> Result<()> {
        let expected = self.order + 1;
        if a.len() != expected || b.len() != expected {
            return Err(FilterError::CoefficientLengthMismatch {
                expected,
                got_a: a.len(),
                got_b: b.len(),
            });
        }

        let a0 = a[0];
        if a0 == 0.0 {
            return Err(FilterError::ZeroLeadingCoefficient);
        }

        self.a = a.iter().map(|&c| c / a0).collect();
        self.b = b.iter().map(|&c| c / a0).collect();

        debug!(order = self.order, "filter coefficients assigned");
        Ok(())
    }

    /// Process a single sample through the filter.
    ///
    /// Evaluates the difference equation
    /// `y = b[0]·x + Σ b[k]·x[n-k] − Σ a[k]·y[n-k]` (valid because `a[0]`
    /// is normalized to 1), then pushes the input and the result onto the
    /// history ring. No numeric validation is performed on the sample;
    /// divergence from a pathological coefficient set is the caller's
    /// concern.
    pub fn process(&mut self, sample: f64) -> f64 {
        let mut result = self.b[0] * sample;
        for k in 1..=self.order {
            let idx = (self.pos + k - 1) % self.order;
            result += self.b[k] * self.x_hist[idx];
            result -= self.a[k] * self.y_hist[idx];
        }

        // Push front: the slot before `pos` becomes the most recent entry,
        // overwriting the oldest.
        self.pos = (self.pos + self.order - 1) % self.order;
        self.x_hist[self.pos] = sample;
        self.y_hist[self.pos] = result;

        result
    }

    /// Process a block of samples, preserving state across elements.
    ///
    /// Observably equivalent to calling [`process`](Self::process) once per
    /// element in order, including for empty and single-element input.
    pub fn process_block(&mut self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.process(s)).collect()
    }

    /// Clear the history buffers, resetting the filter to silence.
    ///
    /// Coefficients are untouched. Useful between discontinuous streams.
    pub fn clear(&mut self) {
        self.x_hist.fill(0.0);
        self.y_hist.fill(0.0);
        self.pos = 0;
    }
}

impl crate::Filter for IirFilter {
    fn process(&mut self, sample: f64) -> f64 {
        IirFilter::process(self, sample)
    }
}
