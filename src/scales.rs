//! Log-Frequency Scale
//!
//! Conversions between Hz and constant-Q bin positions:
//! - Quality factor from bins per octave
//! - Center frequency and analysis window length per bin
//! - Fractional bin position of an arbitrary frequency
//!
//! All math is done in `f64`; kernels are built once, so precision is cheap here.

//=============================================================================
// Constant-Q Relations
// Brown (1991), "Calculation of a constant Q spectral transform"
//=============================================================================

/// Quality factor for the given resolution: `1 / (2^(1/b) - 1)`.
///
/// The ratio of center frequency to bandwidth, identical for every bin.
#[inline]
pub fn q_factor(bins_per_octave: usize) -> f64 {
    1.0 / ((1.0 / bins_per_octave as f64).exp2() - 1.0)
}

/// Center frequency of bin `k`: `f_min * 2^(k / b)`
#[inline]
pub fn center_frequency(min_frequency: f64, bins_per_octave: usize, k: usize) -> f64 {
    min_frequency * (k as f64 / bins_per_octave as f64).exp2()
}

/// Window length in samples needed to resolve `center_hz` at quality `q`
#[inline]
pub fn window_length(q: f64, sample_rate: f64, center_hz: f64) -> usize {
    (q * sample_rate / center_hz).ceil().max(1.0) as usize
}

/// Fractional bin position of a frequency (inverse of [`center_frequency`])
#[inline]
pub fn hz_to_bin(min_frequency: f32, bins_per_octave: usize, hz: f32) -> f32 {
    bins_per_octave as f32 * (hz / min_frequency).log2()
}

/// Frequency at a fractional bin position
#[inline]
pub fn bin_to_hz(min_frequency: f32, bins_per_octave: usize, bin: f32) -> f32 {
    min_frequency * (bin / bins_per_octave as f32).exp2()
}

//=============================================================================
// Band Information
//=============================================================================

/// Information about one transform bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandInfo {
    /// Center frequency in Hz
    pub center_hz: f32,
    /// Bandwidth in Hz (`high_hz - low_hz`)
    pub bandwidth_hz: f32,
    /// Lower edge, half a bin below center
    pub low_hz: f32,
    /// Upper edge, half a bin above center
    pub high_hz: f32,
}

/// Generate `bin_count` log-spaced bands starting at `min_frequency`
pub fn generate_bands(min_frequency: f32, bins_per_octave: usize, bin_count: usize) -> Vec<BandInfo> {
    let half_step = (0.5 / bins_per_octave as f64).exp2();

    (0..bin_count)
        .map(|k| {
            let center = center_frequency(min_frequency as f64, bins_per_octave, k);
            let low_hz = (center / half_step) as f32;
            let high_hz = (center * half_step) as f32;
            BandInfo {
                center_hz: center as f32,
                bandwidth_hz: high_hz - low_hz,
                low_hz,
                high_hz,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_q_factor_24_bins() {
        assert_relative_eq!(q_factor(24), 34.127_087_7, epsilon = 1e-6);
    }

    #[test]
    fn test_q_factor_one_bin_per_octave() {
        // 2^(1/1) - 1 = 1
        assert_relative_eq!(q_factor(1), 1.0);
    }

    #[test]
    fn test_center_frequency_octaves() {
        assert_relative_eq!(center_frequency(55.0, 12, 0), 55.0);
        assert_relative_eq!(center_frequency(55.0, 12, 12), 110.0, epsilon = 1e-9);
        assert_relative_eq!(center_frequency(55.0, 12, 36), 440.0, epsilon = 1e-9);
    }

    #[test]
    fn test_window_length_reference_bin() {
        let q = q_factor(24);
        assert_eq!(window_length(q, 44100.0, 30.87), 48753);
    }

    #[test]
    fn test_window_length_never_zero() {
        assert_eq!(window_length(0.5, 100.0, 1.0e9), 1);
    }

    #[test]
    fn test_bin_roundtrip() {
        for bin in [0.0, 1.5, 23.0, 100.25, 191.0] {
            let hz = bin_to_hz(30.87, 24, bin);
            assert_relative_eq!(hz_to_bin(30.87, 24, hz), bin, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_band_generation() {
        let bands = generate_bands(30.87, 24, 192);
        assert_eq!(bands.len(), 192);

        for pair in bands.windows(2) {
            assert!(pair[1].center_hz > pair[0].center_hz);
            // Adjacent bands share an edge
            assert_relative_eq!(pair[0].high_hz, pair[1].low_hz, max_relative = 1e-5);
        }

        assert_relative_eq!(bands[0].center_hz, 30.87, epsilon = 1e-4);
        assert!(bands[0].low_hz < 30.87 && bands[0].high_hz > 30.87);
    }
}
