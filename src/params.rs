//! Transform Parameters
//!
//! Musical parameters (sample rate, resolution, range) plus the engine
//! options that decide how the kernel is laid out and how results are scaled.

use crate::analyser::OutputScale;
use crate::error::{Error, Result};
use crate::scales;
use crate::window::WindowFunction;

/// Longest window a kernel may require, in samples (~95 s at 44.1 kHz).
///
/// A power of two, so [`FftSizePolicy::PowerOfTwo`] frames stay within it too.
pub const MAX_FFT_SIZE: usize = 1 << 22;

//=============================================================================
// Kernel Layout Options
//=============================================================================

/// How the shared input frame length is derived from the longest window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum FftSizePolicy {
    /// Exactly the lowest bin's window length (direct kernel evaluation)
    #[default]
    Exact,
    /// Next power of two at or above the lowest bin's window length
    PowerOfTwo,
}

impl FftSizePolicy {
    /// Frame length for a longest window of `longest_window` samples
    pub fn frame_len(self, longest_window: usize) -> usize {
        match self {
            FftSizePolicy::Exact => longest_window,
            FftSizePolicy::PowerOfTwo => longest_window.next_power_of_two(),
        }
    }
}

/// Where each bin's window sits inside the input frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum KernelAlignment {
    /// Every bin reads the most recent samples (end of the frame)
    #[default]
    Trailing,
    /// Every bin's window is centred in the frame
    Centered,
}

impl KernelAlignment {
    /// First input index read by a window of `len` samples in a `frame_len` frame
    pub fn offset(self, frame_len: usize, len: usize) -> usize {
        debug_assert!(len <= frame_len);
        match self {
            KernelAlignment::Trailing => frame_len - len,
            KernelAlignment::Centered => {
                let start = (frame_len as f64 / 2.0 - len as f64 / 2.0).ceil() as usize;
                // Odd windows lean one sample earlier so they never overrun the frame
                if len % 2 == 1 {
                    start.saturating_sub(1)
                } else {
                    start
                }
            }
        }
    }
}

//=============================================================================
// Transform Parameters
//=============================================================================

/// Parameters of a constant-Q transform
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TransformParameters {
    /// Sample rate in Hz
    pub sample_rate: f32,
    /// Frequency resolution, bins per doubling of frequency
    pub bins_per_octave: usize,
    /// Number of output bins
    pub bin_count: usize,
    /// Center frequency of bin 0 in Hz
    pub min_frequency: f32,
    /// Taper applied to each bin's basis
    pub window: WindowFunction,
    /// How the input frame length is chosen
    pub fft_size_policy: FftSizePolicy,
    /// Placement of shorter windows within the frame
    pub alignment: KernelAlignment,
    /// Scale of the values written to the output buffer
    pub output_scale: OutputScale,
}

impl Default for TransformParameters {
    /// 44.1 kHz, 8 octaves of 24 bins starting at B0 (30.87 Hz)
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            bins_per_octave: 24,
            bin_count: 192,
            min_frequency: 30.87,
            window: WindowFunction::Hamming,
            fft_size_policy: FftSizePolicy::Exact,
            alignment: KernelAlignment::Trailing,
            output_scale: OutputScale::default(),
        }
    }
}

impl TransformParameters {
    /// Create parameters with the given musical range and default options
    pub fn new(sample_rate: f32, bins_per_octave: usize, bin_count: usize, min_frequency: f32) -> Self {
        Self {
            sample_rate,
            bins_per_octave,
            bin_count,
            min_frequency,
            ..Default::default()
        }
    }

    /// Use `window` to taper each bin's basis
    pub fn with_window(mut self, window: WindowFunction) -> Self {
        self.window = window;
        self
    }

    /// Choose how the input frame length is derived
    pub fn with_fft_size_policy(mut self, policy: FftSizePolicy) -> Self {
        self.fft_size_policy = policy;
        self
    }

    /// Choose where shorter windows sit in the frame
    pub fn with_alignment(mut self, alignment: KernelAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Choose the scale of output values
    pub fn with_output_scale(mut self, output_scale: OutputScale) -> Self {
        self.output_scale = output_scale;
        self
    }

    /// Nyquist frequency in Hz
    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }

    /// Quality factor shared by all bins
    pub fn q_factor(&self) -> f64 {
        scales::q_factor(self.bins_per_octave)
    }

    /// Center frequency of the highest bin in Hz
    pub fn highest_frequency(&self) -> f64 {
        scales::center_frequency(
            self.min_frequency as f64,
            self.bins_per_octave,
            self.bin_count.saturating_sub(1),
        )
    }

    /// Check that these parameters describe a buildable kernel
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(Error::invalid(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.bins_per_octave == 0 {
            return Err(Error::invalid("bins per octave must be positive"));
        }
        if self.bin_count == 0 {
            return Err(Error::invalid("bin count must be positive"));
        }
        if !(self.min_frequency.is_finite() && self.min_frequency > 0.0) {
            return Err(Error::invalid(format!(
                "minimum frequency must be positive, got {}",
                self.min_frequency
            )));
        }

        let nyquist = self.nyquist() as f64;
        let highest = self.highest_frequency();
        if highest >= nyquist {
            return Err(Error::invalid(format!(
                "highest bin at {:.2} Hz is not below Nyquist ({:.2} Hz)",
                highest, nyquist
            )));
        }

        // Bin 0 has the longest window; it sizes the whole frame
        let longest = self.q_factor() * self.sample_rate as f64 / self.min_frequency as f64;
        if !longest.is_finite() || longest.ceil() > MAX_FFT_SIZE as f64 {
            return Err(Error::invalid(format!(
                "lowest bin needs a {:.0}-sample window, above the {} sample limit",
                longest, MAX_FFT_SIZE
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_configuration() {
        let params = TransformParameters::default();
        assert_eq!(params.sample_rate, 44100.0);
        assert_eq!(params.bins_per_octave, 24);
        assert_eq!(params.bin_count, 192);
        assert_eq!(params.min_frequency, 30.87);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_bin_count_need_not_fill_octaves() {
        assert!(TransformParameters::new(48000.0, 12, 37, 55.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let cases = [
            TransformParameters::new(0.0, 24, 192, 30.87),
            TransformParameters::new(-44100.0, 24, 192, 30.87),
            TransformParameters::new(f32::NAN, 24, 192, 30.87),
            TransformParameters::new(44100.0, 0, 192, 30.87),
            TransformParameters::new(44100.0, 24, 0, 30.87),
            TransformParameters::new(44100.0, 24, 192, 0.0),
            TransformParameters::new(44100.0, 24, 192, -1.0),
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(Error::InvalidConfiguration(_))),
                "{:?} should be rejected",
                params
            );
        }
    }

    #[test]
    fn test_rejects_bins_above_nyquist() {
        // 30.87 * 2^(10 octaves) ~ 31.6 kHz > 22.05 kHz
        let params = TransformParameters::new(44100.0, 24, 241, 30.87);
        assert!(matches!(params.validate(), Err(Error::InvalidConfiguration(_))));

        // Minimum frequency alone already at Nyquist
        let params = TransformParameters::new(44100.0, 24, 1, 22050.0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_unbounded_windows() {
        let cases = [
            // Window length overflows to infinity
            TransformParameters::new(44100.0, 24, 1, 1e-30),
            // Finite but far beyond any allocatable frame
            TransformParameters::new(44100.0, 24, 1, 1e-3),
            // Huge resolution makes Q, and with it every window, enormous
            TransformParameters::new(44100.0, 1_000_000, 1, 20.0),
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(Error::InvalidConfiguration(_))),
                "{:?} should be rejected",
                params
            );
        }
    }

    #[test]
    fn test_frame_limit_boundary() {
        // Q(24) * 44100 / 0.5 ~ 3.0M samples, within the limit
        let params = TransformParameters::new(44100.0, 24, 1, 0.5);
        assert!(params.validate().is_ok());
        assert!(FftSizePolicy::PowerOfTwo.frame_len(3_010_010) <= MAX_FFT_SIZE);
        // ~5.0M samples
        let params = TransformParameters::new(44100.0, 24, 1, 0.3);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_power_of_two_policy() {
        assert_eq!(FftSizePolicy::Exact.frame_len(48753), 48753);
        assert_eq!(FftSizePolicy::PowerOfTwo.frame_len(48753), 65536);
        assert_eq!(FftSizePolicy::PowerOfTwo.frame_len(1024), 1024);
    }

    #[test]
    fn test_alignment_offsets() {
        assert_eq!(KernelAlignment::Trailing.offset(100, 40), 60);
        assert_eq!(KernelAlignment::Trailing.offset(100, 100), 0);
        assert_eq!(KernelAlignment::Centered.offset(100, 40), 30);
        assert_eq!(KernelAlignment::Centered.offset(100, 41), 29);
        assert_eq!(KernelAlignment::Centered.offset(100, 100), 0);
        assert_eq!(KernelAlignment::Centered.offset(101, 101), 0);
    }
}
