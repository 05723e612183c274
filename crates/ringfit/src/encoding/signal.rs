use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::EncodingError;

/// The two intensity levels of a binary code band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalLevels {
    pub high: f64,
    pub low: f64,
}

impl Default for SignalLevels {
    fn default() -> Self {
        Self {
            high: 255.0,
            low: 0.0,
        }
    }
}

/// Intensities sampled along the outer and inner code rings, in parallel
/// with one angle sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSignal {
    pub outer: Vec<f64>,
    pub inner: Vec<f64>,
}

impl StepSignal {
    pub fn len(&self) -> usize {
        self.outer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }
}

/// Build a two-channel step signal over `angles`.
///
/// The outer channel sits at `levels.high` and drops to `levels.low` over
/// `notch`; the inner channel is its inverse.
pub fn step_signal(
    angles: &[f64],
    notch: Range<usize>,
    levels: SignalLevels,
) -> Result<StepSignal, EncodingError> {
    let len = angles.len();
    if notch.start > notch.end || notch.end > len {
        return Err(EncodingError::NotchOutOfRange {
            start: notch.start,
            end: notch.end,
            len,
        });
    }

    let mut outer = vec![levels.high; len];
    let mut inner = vec![levels.low; len];
    outer[notch.clone()].fill(levels.low);
    inner[notch].fill(levels.high);

    Ok(StepSignal { outer, inner })
}
