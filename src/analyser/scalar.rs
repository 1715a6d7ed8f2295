//! Scalar Analyser
//!
//! Reference implementation: one multiply-accumulate per sample, accumulated
//! in `f64` so long low-frequency windows do not lose precision.

use super::{bin_value, OutputScale, SpectralAnalyser};
use crate::kernel::Kernel;

/// Reference constant-Q analyser
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarAnalyser;

impl ScalarAnalyser {
    /// Complex response of bin `k` to `input`
    #[inline]
    pub fn bin_response(kernel: &Kernel, k: usize, input: &[f32]) -> (f64, f64) {
        let window = kernel.bin(k).input_window(input);
        let (real, imag) = kernel.coefficients(k);

        let mut sum_re = 0.0f64;
        let mut sum_im = 0.0f64;
        for ((&x, &re), &im) in window.iter().zip(real).zip(imag) {
            let x = x as f64;
            sum_re += x * re as f64;
            sum_im -= x * im as f64;
        }
        (sum_re, sum_im)
    }
}

impl SpectralAnalyser for ScalarAnalyser {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn transform(&self, kernel: &Kernel, input: &[f32], output: &mut [f32], scale: OutputScale) {
        debug_assert_eq!(input.len(), kernel.fft_size(), "input frame length");
        debug_assert_eq!(output.len(), kernel.bin_count(), "output length");

        for (k, out) in output.iter_mut().enumerate().take(kernel.bin_count()) {
            let (re, im) = Self::bin_response(kernel, k, input);
            *out = bin_value(re, im, scale);
        }
    }
}
