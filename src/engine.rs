//! CQT Engine
//!
//! Owns a kernel plus the fixed input/output buffers a host writes frames
//! into and reads spectra out of. Designed to be driven once per rendered
//! frame from a single thread:
//!
//! 1. write samples into [`CqtEngine::input_mut`] (or one of the `write_*` helpers)
//! 2. optionally skip silent frames with [`CqtEngine::detect_silence`]
//! 3. call [`CqtEngine::transform`]
//! 4. read [`CqtEngine::output`]
//!
//! Nothing on that path allocates. Buffers are only reallocated by
//! [`CqtEngine::reconfigure`].

use std::sync::Arc;

use crate::analyser::{AnalyserKind, OutputScale};
use crate::error::Result;
use crate::gate::{self, GateMode};
use crate::kernel::Kernel;
use crate::params::TransformParameters;
use crate::scales::BandInfo;

//=============================================================================
// CQT Engine
//=============================================================================

/// Constant-Q transform engine with engine-owned analysis buffers
#[derive(Debug, Clone)]
pub struct CqtEngine {
    kernel: Arc<Kernel>,
    analyser: AnalyserKind,
    input: Vec<f32>,
    output: Vec<f32>,
}

impl CqtEngine {
    /// Build a kernel for `params` and allocate matching buffers.
    ///
    /// The analyser implementation is picked with [`AnalyserKind::detect`].
    pub fn new(params: TransformParameters) -> Result<Self> {
        let kernel = Kernel::build(&params)?;
        let engine = Self::from_kernel(Arc::new(kernel));
        tracing::info!(
            "CQT engine ready: {} bins from {:.2} Hz at {} Hz, fft_size = {}, {} analyser",
            engine.bin_count(),
            params.min_frequency,
            params.sample_rate,
            engine.fft_size(),
            engine.analyser.analyser().name()
        );
        Ok(engine)
    }

    /// Engine for the reference configuration (44.1 kHz, 192 bins from 30.87 Hz)
    pub fn with_defaults() -> Result<Self> {
        Self::new(TransformParameters::default())
    }

    /// Engine with private buffers around an already built, possibly shared, kernel
    pub fn from_kernel(kernel: Arc<Kernel>) -> Self {
        let input = vec![0.0; kernel.fft_size()];
        let output = vec![kernel.parameters().output_scale.floor(); kernel.bin_count()];
        Self {
            kernel,
            analyser: AnalyserKind::detect(),
            input,
            output,
        }
    }

    /// Rebuild kernel and buffers for new parameters.
    ///
    /// On error the engine keeps its current kernel and buffers untouched.
    pub fn reconfigure(&mut self, params: TransformParameters) -> Result<()> {
        let kernel = Arc::new(Kernel::build(&params)?);
        let input = vec![0.0; kernel.fft_size()];
        let output = vec![params.output_scale.floor(); kernel.bin_count()];

        self.kernel = kernel;
        self.input = input;
        self.output = output;

        tracing::info!(
            "CQT engine reconfigured: {} bins, fft_size = {}",
            self.bin_count(),
            self.fft_size()
        );
        Ok(())
    }

    /// Select the analyser implementation used by [`transform`](Self::transform)
    pub fn set_analyser(&mut self, kind: AnalyserKind) {
        self.analyser = kind;
    }

    /// Analyser implementation used by [`transform`](Self::transform)
    pub fn analyser(&self) -> AnalyserKind {
        self.analyser
    }

    //-------------------------------------------------------------------------
    // Geometry
    //-------------------------------------------------------------------------

    /// Input frame length in samples
    pub fn fft_size(&self) -> usize {
        self.kernel.fft_size()
    }

    /// Number of output bins
    pub fn bin_count(&self) -> usize {
        self.kernel.bin_count()
    }

    /// Parameters the current kernel was built from
    pub fn parameters(&self) -> &TransformParameters {
        self.kernel.parameters()
    }

    /// Shared handle to the kernel
    pub fn kernel(&self) -> &Arc<Kernel> {
        &self.kernel
    }

    /// Center frequency of a bin in Hz
    pub fn center_frequency(&self, bin: usize) -> f64 {
        self.kernel.center_frequency(bin)
    }

    /// Band edges of every bin
    pub fn band_info(&self) -> &[BandInfo] {
        self.kernel.band_info()
    }

    //-------------------------------------------------------------------------
    // Buffers
    //-------------------------------------------------------------------------

    /// Current input frame
    pub fn input(&self) -> &[f32] {
        &self.input
    }

    /// Input frame for the host to fill; all `fft_size` samples belong to the next transform
    pub fn input_mut(&mut self) -> &mut [f32] {
        &mut self.input
    }

    /// Result of the last transform, one value per bin
    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Output buffer, for hosts that post-process spectra in place
    pub fn output_mut(&mut self) -> &mut [f32] {
        &mut self.output
    }

    /// Zero the input frame
    pub fn clear_input(&mut self) {
        self.input.fill(0.0);
    }

    /// Replace the input frame with `frame`, aligned to the end.
    ///
    /// Shorter frames are zero-padded at the front; longer frames keep only
    /// their most recent `fft_size` samples.
    pub fn write_frame(&mut self, frame: &[f32]) {
        let n = self.input.len();
        if frame.len() >= n {
            self.input.copy_from_slice(&frame[frame.len() - n..]);
        } else {
            let pad = n - frame.len();
            self.input[..pad].fill(0.0);
            self.input[pad..].copy_from_slice(frame);
        }
    }

    /// Replace the input frame with the mono mix of a stereo frame
    pub fn write_frame_stereo(&mut self, left: &[f32], right: &[f32]) {
        let n = self.input.len();
        let len = left.len().min(right.len());
        let take = len.min(n);
        let pad = n - take;

        self.input[..pad].fill(0.0);
        let (left, right) = (&left[len - take..len], &right[len - take..len]);
        for ((out, &l), &r) in self.input[pad..].iter_mut().zip(left).zip(right) {
            *out = (l + r) * 0.5;
        }
    }

    /// Slide the frame by `samples.len()` and append `samples` at the end
    pub fn push_samples(&mut self, samples: &[f32]) {
        let n = self.input.len();
        if samples.len() >= n {
            self.input.copy_from_slice(&samples[samples.len() - n..]);
        } else {
            let keep = n - samples.len();
            self.input.copy_within(samples.len().., 0);
            self.input[keep..].copy_from_slice(samples);
        }
    }

    //-------------------------------------------------------------------------
    // Processing
    //-------------------------------------------------------------------------

    /// Whether the current input frame is silent (peak energy gate)
    pub fn detect_silence(&self, threshold: f32) -> bool {
        gate::is_silent(&self.input, threshold, GateMode::Peak)
    }

    /// Whether the current input frame is silent under `mode`
    pub fn detect_silence_with(&self, threshold: f32, mode: GateMode) -> bool {
        gate::is_silent(&self.input, threshold, mode)
    }

    /// Transform the input frame into the output buffer with the selected analyser
    pub fn transform(&mut self) {
        self.transform_with(self.analyser);
    }

    /// Transform with the scalar reference analyser
    pub fn transform_scalar(&mut self) {
        self.transform_with(AnalyserKind::Scalar);
    }

    /// Transform with the vectorized analyser
    pub fn transform_vectorized(&mut self) {
        self.transform_with(AnalyserKind::Vectorized);
    }

    /// Transform with a specific analyser
    pub fn transform_with(&mut self, kind: AnalyserKind) {
        let scale = self.output_scale();
        kind.analyser()
            .transform(&self.kernel, &self.input, &mut self.output, scale);
    }

    /// Gate then transform.
    ///
    /// Returns `false` and fills the output with the scale's floor when the
    /// frame is silent under `threshold`.
    pub fn process(&mut self, threshold: f32) -> bool {
        if self.detect_silence(threshold) {
            let floor = self.output_scale().floor();
            self.output.fill(floor);
            return false;
        }
        self.transform();
        true
    }

    /// Bin with the largest output value
    pub fn peak_bin(&self) -> Option<usize> {
        self.output
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(k, _)| k)
    }

    fn output_scale(&self) -> OutputScale {
        self.kernel.parameters().output_scale
    }
}
