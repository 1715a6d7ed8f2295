//! Spectral Analysers
//!
//! Two implementations of the same per-frame transform:
//! - [`ScalarAnalyser`] - straightforward `f64` accumulation, the reference
//! - [`VectorizedAnalyser`] - 4-lane blocks, same result within
//!   [`VECTORIZED_RELATIVE_TOLERANCE`]
//!
//! Both read a full input frame, apply every bin kernel to its window of the
//! frame and write one value per bin into a caller-provided output slice.

pub mod scalar;
pub mod vectorized;

pub use scalar::ScalarAnalyser;
pub use vectorized::{
    VectorizedAnalyser, VECTORIZED_ABSOLUTE_TOLERANCE, VECTORIZED_RELATIVE_TOLERANCE,
};

use crate::kernel::Kernel;

//=============================================================================
// Output Scale
//=============================================================================

/// Reference level of the log-magnitude scale (full scale of 16-bit audio)
pub const LOG_MAGNITUDE_REFERENCE: f64 = 32768.0;

/// Scale of the values an analyser writes per bin
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum OutputScale {
    /// Linear magnitude `|X[k]|`
    Magnitude,
    /// `10 * ln(|X[k]| / 32768)`, never below `floor`.
    ///
    /// Full-scale tones land around -120, silence at the floor. Displays
    /// map this range with `(value - floor) * gain`.
    LogMagnitude { floor: f32 },
    /// `20 * log10(|X[k]|)`, never below `floor`
    Decibels { floor: f32 },
}

impl Default for OutputScale {
    fn default() -> Self {
        OutputScale::LogMagnitude { floor: -170.0 }
    }
}

impl OutputScale {
    /// Convert a linear magnitude to this scale
    #[inline]
    pub fn apply(self, magnitude: f64) -> f32 {
        match self {
            OutputScale::Magnitude => magnitude as f32,
            OutputScale::LogMagnitude { floor } => {
                if magnitude > 0.0 {
                    ((10.0 * (magnitude / LOG_MAGNITUDE_REFERENCE).ln()) as f32).max(floor)
                } else {
                    floor
                }
            }
            OutputScale::Decibels { floor } => {
                if magnitude > 0.0 {
                    ((20.0 * magnitude.log10()) as f32).max(floor)
                } else {
                    floor
                }
            }
        }
    }

    /// Value written for a bin with no energy
    pub fn floor(self) -> f32 {
        match self {
            OutputScale::Magnitude => 0.0,
            OutputScale::LogMagnitude { floor } | OutputScale::Decibels { floor } => floor,
        }
    }
}

#[inline]
pub(crate) fn bin_value(re: f64, im: f64, scale: OutputScale) -> f32 {
    scale.apply((re * re + im * im).sqrt())
}

//=============================================================================
// Analyser Capability
//=============================================================================

/// A per-frame constant-Q transform implementation.
///
/// `input` must hold exactly `kernel.fft_size()` samples and `output`
/// exactly `kernel.bin_count()` values; lengths are only checked in debug
/// builds. Implementations never allocate.
pub trait SpectralAnalyser: Send + Sync {
    /// Short identifier, for logs
    fn name(&self) -> &'static str;

    /// Transform one frame into `output`
    fn transform(&self, kernel: &Kernel, input: &[f32], output: &mut [f32], scale: OutputScale);
}

static SCALAR: ScalarAnalyser = ScalarAnalyser;
static VECTORIZED: VectorizedAnalyser = VectorizedAnalyser;

/// Which analyser implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum AnalyserKind {
    /// Reference implementation
    #[default]
    Scalar,
    /// Wide-arithmetic implementation
    Vectorized,
}

impl AnalyserKind {
    /// Pick the fastest implementation the running CPU supports
    pub fn detect() -> Self {
        if vectorized::is_supported() {
            AnalyserKind::Vectorized
        } else {
            AnalyserKind::Scalar
        }
    }

    /// The analyser implementing this kind
    pub fn analyser(self) -> &'static dyn SpectralAnalyser {
        match self {
            AnalyserKind::Scalar => &SCALAR,
            AnalyserKind::Vectorized => &VECTORIZED,
        }
    }
}
