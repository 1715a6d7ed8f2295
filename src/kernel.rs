//! Time-Domain Kernel
//!
//! Precomputed per-bin analysis coefficients for a direct constant-Q
//! transform (Brown & Puckette, 1992; Schörkhuber & Klapuri, 2010):
//!
//! ```text
//! T_k[n] = w(N_k, n) * exp(j * 2*pi * f_k * (n - N_k/2) / fs) / N_k,   0 <= n < N_k
//! X[k]   = sum_n x[offset_k + n] * conj(T_k[n])
//! ```
//!
//! Only the non-zero span of each kernel is stored. Coefficients of all bins
//! are packed back to back in two flat arrays (real and imaginary), so a
//! transform walks memory linearly bin after bin.

use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::params::TransformParameters;
use crate::scales::{self, BandInfo};

/// Most coefficients (per component) a kernel may store, 256 MiB each
pub const MAX_KERNEL_TAPS: usize = 1 << 26;

//=============================================================================
// Bin Kernel
//=============================================================================

/// Layout and tuning of a single transform bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinKernel {
    center_frequency: f64,
    window_length: usize,
    offset: usize,
    coeff_start: usize,
}

impl BinKernel {
    /// Center frequency in Hz
    pub fn center_frequency(&self) -> f64 {
        self.center_frequency
    }

    /// Number of input samples this bin reads
    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// Index of the first input sample this bin reads
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Slice of the input frame covered by this bin's window
    #[inline]
    pub fn input_window<'a>(&self, input: &'a [f32]) -> &'a [f32] {
        &input[self.offset..self.offset + self.window_length]
    }
}

//=============================================================================
// Kernel
//=============================================================================

/// Immutable constant-Q kernel for one parameter set.
///
/// Built once, then shared read-only (typically behind an `Arc`) by every
/// transform call.
#[derive(Debug, Clone)]
pub struct Kernel {
    params: TransformParameters,
    fft_size: usize,
    q: f64,
    bins: Vec<BinKernel>,
    bands: Vec<BandInfo>,
    real: Vec<f32>,
    imag: Vec<f32>,
}

impl Kernel {
    /// Build the kernel for `params`.
    ///
    /// Fails with [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration)
    /// when the parameters cannot produce a valid kernel; nothing is built in
    /// that case.
    pub fn build(params: &TransformParameters) -> Result<Self> {
        if let Err(e) = params.validate() {
            tracing::warn!("Rejected CQT configuration {:?}: {}", params, e);
            return Err(e);
        }

        let fs = params.sample_rate as f64;
        let fmin = params.min_frequency as f64;
        let bpo = params.bins_per_octave;
        let q = scales::q_factor(bpo);

        // Bin 0 has the lowest frequency, hence the longest window
        let longest = scales::window_length(q, fs, fmin);
        let fft_size = params.fft_size_policy.frame_len(longest);

        let mut bins = Vec::with_capacity(params.bin_count);
        let mut total_taps = 0;
        for k in 0..params.bin_count {
            let center_frequency = scales::center_frequency(fmin, bpo, k);
            let window_length = scales::window_length(q, fs, center_frequency).min(fft_size);
            bins.push(BinKernel {
                center_frequency,
                window_length,
                offset: params.alignment.offset(fft_size, window_length),
                coeff_start: total_taps,
            });
            total_taps = total_taps
                .checked_add(window_length)
                .filter(|&taps| taps <= MAX_KERNEL_TAPS)
                .ok_or_else(|| {
                    let e = Error::invalid(format!(
                        "kernel needs more than {} coefficients",
                        MAX_KERNEL_TAPS
                    ));
                    tracing::warn!("Rejected CQT configuration {:?}: {}", params, e);
                    e
                })?;
        }

        let mut real = Vec::with_capacity(total_taps);
        let mut imag = Vec::with_capacity(total_taps);
        for bin in &bins {
            let len = bin.window_length;
            let norm = 1.0 / len as f64;
            let omega = 2.0 * PI * bin.center_frequency / fs;
            // Phase referenced to the window centre
            let half = (len / 2) as f64;
            for n in 0..len {
                let win = params.window.value(len, n) * norm;
                let phase = omega * (n as f64 - half);
                real.push((win * phase.cos()) as f32);
                imag.push((win * phase.sin()) as f32);
            }
        }

        tracing::debug!(
            "Built CQT kernel: {} bins, {} bins/octave, Q = {:.3}, fft_size = {}, {} taps",
            params.bin_count,
            bpo,
            q,
            fft_size,
            total_taps
        );

        Ok(Self {
            params: *params,
            fft_size,
            q,
            bands: scales::generate_bands(params.min_frequency, bpo, params.bin_count),
            bins,
            real,
            imag,
        })
    }

    /// Parameters this kernel was built from
    pub fn parameters(&self) -> &TransformParameters {
        &self.params
    }

    /// Length of the input frame
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of output bins
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Frequency resolution in bins per octave
    pub fn bins_per_octave(&self) -> usize {
        self.params.bins_per_octave
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> f32 {
        self.params.sample_rate
    }

    /// Quality factor shared by all bins
    pub fn q_factor(&self) -> f64 {
        self.q
    }

    /// All bin kernels, lowest frequency first
    pub fn bins(&self) -> &[BinKernel] {
        &self.bins
    }

    /// Kernel of bin `k`
    pub fn bin(&self, k: usize) -> &BinKernel {
        &self.bins[k]
    }

    /// Center frequency of bin `k` in Hz
    pub fn center_frequency(&self, k: usize) -> f64 {
        self.bins[k].center_frequency
    }

    /// Window length of bin `k` in samples
    pub fn window_length(&self, k: usize) -> usize {
        self.bins[k].window_length
    }

    /// Band edges of every bin
    pub fn band_info(&self) -> &[BandInfo] {
        &self.bands
    }

    /// Real and imaginary coefficients of bin `k`
    #[inline]
    pub fn coefficients(&self, k: usize) -> (&[f32], &[f32]) {
        let bin = &self.bins[k];
        let span = bin.coeff_start..bin.coeff_start + bin.window_length;
        (&self.real[span.clone()], &self.imag[span])
    }

    /// Total number of stored coefficients per component
    pub fn total_taps(&self) -> usize {
        self.real.len()
    }
}
