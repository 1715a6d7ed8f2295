//! Silence Gate
//!
//! Cheap energy check over an input frame so callers can skip the
//! transform entirely on silent frames. One pass, no windowing, no trig.

/// Energy statistic compared against the gate threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum GateMode {
    /// Silent unless some sample has `x^2 > threshold`. Stops at the first loud sample.
    #[default]
    Peak,
    /// Silent when the mean of `x^2` over the frame is at most `threshold`
    MeanSquare,
}

/// Whether `input` is below `threshold` (an energy, i.e. squared amplitude).
///
/// A threshold of zero or less disables the gate: nothing is ever silent.
pub fn is_silent(input: &[f32], threshold: f32, mode: GateMode) -> bool {
    if threshold.is_nan() || threshold <= 0.0 {
        return false;
    }

    match mode {
        GateMode::Peak => !input.iter().any(|&x| x * x > threshold),
        GateMode::MeanSquare => {
            if input.is_empty() {
                return true;
            }
            let energy: f64 = input.iter().map(|&x| (x as f64) * (x as f64)).sum();
            energy / input.len() as f64 <= threshold as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [GateMode; 2] = [GateMode::Peak, GateMode::MeanSquare];

    #[test]
    fn test_zeros_are_silent() {
        let input = vec![0.0; 4096];
        for mode in MODES {
            for threshold in [1e-20, 1e-10, 0.5, 1.0] {
                assert!(is_silent(&input, threshold, mode));
            }
        }
    }

    #[test]
    fn test_full_scale_is_not_silent() {
        let input: Vec<f32> = (0..4096).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        for mode in MODES {
            for threshold in [1e-10, 1e-3, 0.5] {
                assert!(!is_silent(&input, threshold, mode));
            }
        }
    }

    #[test]
    fn test_zero_threshold_disables_gate() {
        let input = vec![0.0; 512];
        for mode in MODES {
            assert!(!is_silent(&input, 0.0, mode));
            assert!(!is_silent(&input, -1.0, mode));
            assert!(!is_silent(&input, f32::NAN, mode));
        }
    }

    #[test]
    fn test_peak_catches_single_click() {
        let mut input = vec![0.0; 4096];
        input[2048] = 0.1;
        // x^2 = 0.01
        assert!(!is_silent(&input, 1e-3, GateMode::Peak));
        // Mean energy is 0.01 / 4096, below the same threshold
        assert!(is_silent(&input, 1e-3, GateMode::MeanSquare));
    }

    #[test]
    fn test_noise_floor() {
        let input = vec![1e-6; 1024];
        // x^2 = 1e-12, under a typical 1e-10 floor
        assert!(is_silent(&input, 1e-10, GateMode::Peak));
        assert!(is_silent(&input, 1e-10, GateMode::MeanSquare));
        assert!(!is_silent(&input, 1e-13, GateMode::Peak));
    }
}
