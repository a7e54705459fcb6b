//! Float to 16-bit sample quantization.
//!
//! Both encoders convert decoded `f32` samples with the same rule: clamp to
//! `[-1.0, 1.0]`, scale negative values by 32768 and non-negative values by
//! 32767, then truncate toward zero. The asymmetric scale uses the full
//! signed 16-bit range without overflowing at `+1.0`.

/// Scale applied to negative samples (`0x8000`).
const NEGATIVE_SCALE: f32 = 32768.0;

/// Scale applied to zero and positive samples (`0x7FFF`).
const POSITIVE_SCALE: f32 = 32767.0;

/// Quantize one floating-point sample to a signed 16-bit integer.
///
/// NaN quantizes to `0`.
///
/// # Example
///
/// ```
/// use audiolift::quantize;
///
/// assert_eq!(quantize(1.0), 32767);
/// assert_eq!(quantize(-1.0), -32768);
/// assert_eq!(quantize(2.5), 32767);
/// assert_eq!(quantize(0.5), 16383);
/// ```
#[inline]
pub fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * NEGATIVE_SCALE) as i16
    } else {
        (clamped * POSITIVE_SCALE) as i16
    }
}

/// Quantize a window of samples into `destination`, replacing its contents.
///
/// The destination's allocation is reused across calls.
pub fn quantize_into(samples: &[f32], destination: &mut Vec<i16>) {
    destination.clear();
    destination.extend(samples.iter().copied().map(quantize));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_zero() {
        assert_eq!(quantize(-1.0), -32768);
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(-0.0), 0);
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(quantize(1.5), 32767);
        assert_eq!(quantize(-7.0), -32768);
        assert_eq!(quantize(f32::INFINITY), 32767);
        assert_eq!(quantize(f32::NEG_INFINITY), -32768);
    }

    #[test]
    fn truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(quantize(0.5), 16383);
        // -0.5 * 32768 = -16384 exactly
        assert_eq!(quantize(-0.5), -16384);
        // -0.25 * 32768 = -8192, -0.2 * 32768 = -6553.6
        assert_eq!(quantize(-0.2), -6553);
    }

    #[test]
    fn nan_is_silent() {
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn stays_in_range_over_a_sweep() {
        let mut value = -1.0_f32;
        while value <= 1.0 {
            let q = quantize(value) as i32;
            assert!((-32768..=32767).contains(&q));
            value += 0.001;
        }
    }

    #[test]
    fn quantize_into_reuses_destination() {
        let mut destination = vec![1, 2, 3, 4, 5];
        quantize_into(&[0.0, 1.0, -1.0], &mut destination);
        assert_eq!(destination, vec![0, 32767, -32768]);
    }
}
