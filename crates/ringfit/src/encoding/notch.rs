use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::{EncodingError, StepSignal};

/// Samples within this distance of zero count as the notch level.
pub const ZERO_LEVEL_EPS: f64 = 1e-9;

/// Index of the notch start: the smallest angle among zero-valued samples.
///
/// Ties on the angle resolve to the lowest index.
pub fn find_notch_start(signal: &[f64], angles: &[f64]) -> Result<usize, EncodingError> {
    if signal.len() != angles.len() {
        return Err(EncodingError::LengthMismatch {
            signal: signal.len(),
            angles: angles.len(),
        });
    }

    signal
        .iter()
        .zip(angles)
        .enumerate()
        .filter(|(_, (v, _))| v.abs() <= ZERO_LEVEL_EPS)
        .min_by(|(ia, (_, ta)), (ib, (_, tb))| ta.total_cmp(tb).then(ia.cmp(ib)))
        .map(|(i, _)| i)
        .ok_or(EncodingError::NotchNotFound { len: signal.len() })
}

/// Circular shift so that `sequence[offset]` becomes the first element.
///
/// Offsets wrap modulo the length; an empty sequence is returned as is.
pub fn rotate<T: Clone>(sequence: &[T], offset: usize) -> Vec<T> {
    let mut out = sequence.to_vec();
    if !out.is_empty() {
        let k = offset % out.len();
        out.rotate_left(k);
    }
    out
}

/// `n + 1` evenly spaced angles over `[0, 2π]` bounding `n` code sectors.
pub fn sector_boundaries(n: usize) -> Vec<f64> {
    if n == 0 {
        return vec![0.0];
    }
    (0..=n).map(|i| i as f64 * TAU / n as f64).collect()
}

/// Signal and angles rotated so the notch starts at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSignal {
    /// Index of the notch start in the unrotated sequences.
    pub offset: usize,
    /// Angle at which the notch started before rotation.
    pub notch_angle: f64,
    /// Rotated angle sequence.
    pub angles: Vec<f64>,
    /// Rotated channels.
    pub signal: StepSignal,
}

/// Locate the notch on the outer channel and rotate both channels and the
/// angles by the same offset.
pub fn align_to_notch(
    signal: &StepSignal,
    angles: &[f64],
) -> Result<AlignedSignal, EncodingError> {
    if signal.inner.len() != angles.len() {
        return Err(EncodingError::LengthMismatch {
            signal: signal.inner.len(),
            angles: angles.len(),
        });
    }
    let offset = find_notch_start(&signal.outer, angles)?;
    tracing::debug!(offset, angle = angles[offset], "notch located");

    Ok(AlignedSignal {
        offset,
        notch_angle: angles[offset],
        angles: rotate(angles, offset),
        signal: StepSignal {
            outer: rotate(&signal.outer, offset),
            inner: rotate(&signal.inner, offset),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::AngleSample;
    use crate::encoding::{step_signal, SignalLevels};
    use approx::assert_relative_eq;

    #[test]
    fn demo_signal_aligns_notch_to_start() {
        let angles = AngleSample::full_turn(144);
        let s = step_signal(&angles, 60..72, SignalLevels::default()).expect("valid notch");

        assert_eq!(find_notch_start(&s.outer, &angles), Ok(60));

        let aligned = align_to_notch(&s, &angles).expect("notch present");
        assert_eq!(aligned.offset, 60);
        assert_eq!(aligned.signal.outer[0], 0.0);
        assert_eq!(aligned.signal.outer[11], 0.0);
        assert_eq!(aligned.signal.outer[12], 255.0);
        assert_eq!(aligned.signal.inner[0], 255.0);
        assert_eq!(aligned.signal.inner[12], 0.0);
        assert_eq!(aligned.angles[0], angles[60]);
        assert_relative_eq!(aligned.notch_angle, 60.0 * TAU / 144.0, epsilon = 1e-12);
    }

    #[test]
    fn picks_smallest_angle_not_first_index() {
        // Angles out of order: the smallest zero-valued angle sits at index 3.
        let angles = [0.5, 0.1, 0.9, 0.05, 0.7];
        let signal = [0.0, 255.0, 0.0, 0.0, 255.0];
        assert_eq!(find_notch_start(&signal, &angles), Ok(3));
    }

    #[test]
    fn near_zero_counts_as_notch() {
        let angles = [0.0, 1.0, 2.0];
        let signal = [255.0, 1e-12, 255.0];
        assert_eq!(find_notch_start(&signal, &angles), Ok(1));
    }

    #[test]
    fn missing_notch_is_an_error() {
        let angles = AngleSample::full_turn(16);
        let signal = vec![255.0; 16];
        assert_eq!(
            find_notch_start(&signal, &angles),
            Err(EncodingError::NotchNotFound { len: 16 })
        );

        let flat = StepSignal {
            outer: signal.clone(),
            inner: vec![0.0; 16],
        };
        assert!(align_to_notch(&flat, &angles).is_err());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert_eq!(
            find_notch_start(&[0.0, 1.0], &[0.0]),
            Err(EncodingError::LengthMismatch {
                signal: 2,
                angles: 1
            })
        );
    }

    #[test]
    fn rotate_moves_offset_to_front() {
        let seq = [10, 11, 12, 13, 14];
        assert_eq!(rotate(&seq, 0), vec![10, 11, 12, 13, 14]);
        assert_eq!(rotate(&seq, 2), vec![12, 13, 14, 10, 11]);
        assert_eq!(rotate(&seq, 4), vec![14, 10, 11, 12, 13]);
        assert_eq!(rotate(&seq, 5), seq.to_vec());
        assert_eq!(rotate(&seq, 7), rotate(&seq, 2));
        assert!(rotate::<i32>(&[], 3).is_empty());
    }

    #[test]
    fn rotate_inverse_restores_sequence() {
        let seq: Vec<u32> = (0..37).collect();
        let n = seq.len();
        for k in 0..n {
            assert_eq!(rotate(&rotate(&seq, k), n - k), seq, "k = {}", k);
        }
    }

    #[test]
    fn sector_boundaries_cover_full_turn() {
        let b = sector_boundaries(12);
        assert_eq!(b.len(), 13);
        assert_eq!(b[0], 0.0);
        assert_relative_eq!(b[12], TAU, epsilon = 1e-12);
        assert_relative_eq!(b[1], TAU / 12.0, epsilon = 1e-15);
    }
}
