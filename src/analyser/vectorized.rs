//! Vectorized Analyser
//!
//! Same transform as [`ScalarAnalyser`](super::ScalarAnalyser), restructured
//! for wide arithmetic:
//!
//! - Samples are processed four at a time in `f32` lanes
//! - Lanes run over blocks of [`BLOCK_LEN`] samples, then fold into an `f64`
//!   accumulator, which keeps rounding error bounded for long windows
//! - Window lengths not divisible by four finish with a scalar tail
//!
//! On x86_64 the lane kernel uses SSE intrinsics (part of the target's
//! baseline). Other targets use portable `[f32; 4]` lanes, which the
//! compiler lowers to NEON or `simd128` where available.

use super::{bin_value, OutputScale, SpectralAnalyser};
use crate::kernel::Kernel;

/// Samples per lane group
pub const LANES: usize = 4;

/// Samples accumulated in `f32` before folding into `f64`
pub const BLOCK_LEN: usize = 64;

/// Maximum relative deviation from the scalar analyser's magnitudes
pub const VECTORIZED_RELATIVE_TOLERANCE: f32 = 1e-4;

/// Absolute slack on magnitudes near zero, for full-scale (±1.0) input
pub const VECTORIZED_ABSOLUTE_TOLERANCE: f32 = 1e-7;

/// Whether the running CPU has native vector arithmetic for this analyser
#[cfg(target_arch = "x86_64")]
pub fn is_supported() -> bool {
    is_x86_feature_detected!("sse2")
}

/// Whether the running CPU has native vector arithmetic for this analyser
#[cfg(target_arch = "aarch64")]
pub fn is_supported() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

/// Whether the running CPU has native vector arithmetic for this analyser
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub fn is_supported() -> bool {
    cfg!(all(target_arch = "wasm32", target_feature = "simd128"))
}

/// Wide-arithmetic constant-Q analyser
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorizedAnalyser;

impl VectorizedAnalyser {
    /// Complex response of bin `k` to `input`
    #[inline]
    pub fn bin_response(kernel: &Kernel, k: usize, input: &[f32]) -> (f64, f64) {
        let window = kernel.bin(k).input_window(input);
        let (real, imag) = kernel.coefficients(k);

        let mut sum_re = 0.0f64;
        let mut sum_im = 0.0f64;

        let mut x_blocks = window.chunks_exact(BLOCK_LEN);
        let mut re_blocks = real.chunks_exact(BLOCK_LEN);
        let mut im_blocks = imag.chunks_exact(BLOCK_LEN);
        for ((x, re), im) in (&mut x_blocks).zip(&mut re_blocks).zip(&mut im_blocks) {
            let (block_re, block_im) = lanes::dot(x, re, im);
            sum_re += block_re;
            sum_im += block_im;
        }

        // Remainder: whole lane groups first, then single samples
        let (x, re, im) = (
            x_blocks.remainder(),
            re_blocks.remainder(),
            im_blocks.remainder(),
        );
        let split = x.len() - x.len() % LANES;
        let (block_re, block_im) = lanes::dot(&x[..split], &re[..split], &im[..split]);
        sum_re += block_re;
        sum_im += block_im;

        for ((&x, &re), &im) in x[split..].iter().zip(&re[split..]).zip(&im[split..]) {
            let x = x as f64;
            sum_re += x * re as f64;
            sum_im -= x * im as f64;
        }

        (sum_re, sum_im)
    }
}

impl SpectralAnalyser for VectorizedAnalyser {
    fn name(&self) -> &'static str {
        "vectorized"
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

//=============================================================================
// Lane Kernels
// `dot` takes equal-length slices whose length is a multiple of LANES and
// returns (sum x*re, -sum x*im), each lane summed in f32.
//=============================================================================

#[cfg(target_arch = "x86_64")]
mod lanes {
    use super::LANES;
    use std::arch::x86_64::{
        __m128, _mm_add_ps, _mm_loadu_ps, _mm_mul_ps, _mm_setzero_ps, _mm_storeu_ps, _mm_sub_ps,
    };

    #[inline]
    pub(super) fn dot(x: &[f32], re: &[f32], im: &[f32]) -> (f64, f64) {
        debug_assert_eq!(x.len() % LANES, 0);
        debug_assert!(re.len() == x.len() && im.len() == x.len());

        // SAFETY: SSE is part of the x86_64 baseline. Every load reads LANES
        // floats starting at `i`, and `i + LANES <= len` for all three slices.
        unsafe {
            let mut sum_re = _mm_setzero_ps();
            let mut sum_im = _mm_setzero_ps();
            for i in (0..x.len()).step_by(LANES) {
                let xv = _mm_loadu_ps(x.as_ptr().add(i));
                let rv = _mm_loadu_ps(re.as_ptr().add(i));
                let iv = _mm_loadu_ps(im.as_ptr().add(i));
                sum_re = _mm_add_ps(sum_re, _mm_mul_ps(xv, rv));
                sum_im = _mm_sub_ps(sum_im, _mm_mul_ps(xv, iv));
            }
            (horizontal_sum(sum_re), horizontal_sum(sum_im))
        }
    }

    #[inline]
    unsafe fn horizontal_sum(v: __m128) -> f64 {
        let mut lanes = [0.0f32; LANES];
        _mm_storeu_ps(lanes.as_mut_ptr(), v);
        lanes.iter().map(|&l| l as f64).sum()
    }
}

#[cfg(not(target_arch = "x86_64"))]
mod lanes {
    use super::LANES;

    #[inline]
    pub(super) fn dot(x: &[f32], re: &[f32], im: &[f32]) -> (f64, f64) {
        debug_assert_eq!(x.len() % LANES, 0);
        debug_assert!(re.len() == x.len() && im.len() == x.len());

        let mut sum_re = [0.0f32; LANES];
        let mut sum_im = [0.0f32; LANES];
        for ((x, re), im) in x
            .chunks_exact(LANES)
            .zip(re.chunks_exact(LANES))
            .zip(im.chunks_exact(LANES))
        {
            for l in 0..LANES {
                sum_re[l] += x[l] * re[l];
                sum_im[l] -= x[l] * im[l];
            }
        }
        (
            sum_re.iter().map(|&l| l as f64).sum(),
            sum_im.iter().map(|&l| l as f64).sum(),
        )
    }
}
