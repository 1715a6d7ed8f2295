//! # Constq - Real-time Constant-Q Transform
//!
//! A log-frequency spectrum analysis library: every bin has the same
//! ratio of center frequency to bandwidth, so resolution is equal per
//! musical semitone instead of per Hz. Built for visualizers that analyse
//! streaming audio once per rendered frame (60 Hz and up).
//!
//! ## Quick Start
//!
//! ```rust
//! use constq::{CqtEngine, TransformParameters};
//!
//! // 16 kHz, 3 octaves of semitones starting at A2
//! let params = TransformParameters::new(16000.0, 12, 36, 110.0);
//! let mut engine = CqtEngine::new(params)?;
//!
//! // Host writes a frame of fft_size samples
//! let frame: Vec<f32> = vec![0.0; engine.fft_size()]; // Your audio data
//! engine.write_frame(&frame);
//!
//! // Skip silent frames, otherwise transform
//! if !engine.detect_silence(1e-10) {
//!     engine.transform();
//! }
//!
//! // One log-magnitude value per bin
//! let spectrum: &[f32] = engine.output();
//! assert_eq!(spectrum.len(), 36);
//! # Ok::<(), constq::Error>(())
//! ```
//!
//! ## Components
//!
//! - **Kernel** - per-bin windowed complex sinusoids, built once from the
//!   musical parameters and shared read-only
//! - **Scalar analyser** - reference transform, `f64` accumulation
//! - **Vectorized analyser** - same transform in 4-lane blocks
//! - **Silence gate** - one-pass energy check to skip silent frames
//! - **Engine** - owns kernel and fixed buffers, no per-frame allocation
//!
//! ## Output Scales
//!
//! | Scale | Value | Silence |
//! |-------|-------|---------|
//! | `Magnitude` | `\|X[k]\|` | 0 |
//! | `LogMagnitude` (default) | `10 ln(\|X[k]\| / 32768)` | floor (-170) |
//! | `Decibels` | `20 log10 \|X[k]\|` | floor |

pub mod analyser;
pub mod engine;
pub mod error;
pub mod gate;
pub mod kernel;
pub mod params;
pub mod scales;
pub mod window;

// Re-export main types at crate root
pub use analyser::{
    AnalyserKind, OutputScale, ScalarAnalyser, SpectralAnalyser, VectorizedAnalyser,
    VECTORIZED_ABSOLUTE_TOLERANCE, VECTORIZED_RELATIVE_TOLERANCE,
};
pub use engine::CqtEngine;
pub use error::{Error, Result};
pub use gate::{is_silent, GateMode};
pub use kernel::{BinKernel, Kernel, MAX_KERNEL_TAPS};
pub use params::{FftSizePolicy, KernelAlignment, TransformParameters, MAX_FFT_SIZE};
pub use scales::{bin_to_hz, center_frequency, hz_to_bin, q_factor, window_length, BandInfo};
pub use window::WindowFunction;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Major version number
pub const VERSION_MAJOR: u32 = 0;

/// Minor version number
pub const VERSION_MINOR: u32 = 1;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;
