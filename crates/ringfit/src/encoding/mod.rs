//! Angular code-band signals: synthesis, notch detection and alignment.
//!
//! A code band sampled around a marker perimeter arrives at an unknown
//! rotation. The zero-level run on the outer channel marks the code origin;
//! rotating the samples so that run begins at index 0 puts every sector at a
//! fixed position.

mod notch;
mod signal;

pub use notch::{
    align_to_notch, find_notch_start, rotate, sector_boundaries, AlignedSignal, ZERO_LEVEL_EPS,
};
pub use signal::{step_signal, SignalLevels, StepSignal};

/// Errors from signal synthesis and notch alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// Signal and angle sequences are not parallel.
    LengthMismatch {
        /// Number of signal samples.
        signal: usize,
        /// Number of angles.
        angles: usize,
    },
    /// Requested notch range does not fit inside the sample.
    NotchOutOfRange {
        /// First index of the requested notch.
        start: usize,
        /// One past the last index of the requested notch.
        end: usize,
        /// Number of samples available.
        len: usize,
    },
    /// No sample sits at the zero level.
    NotchNotFound {
        /// Number of samples searched.
        len: usize,
    },
}

impl std::fmt::Display for EncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { signal, angles } => write!(
                f,
                "signal/angle length mismatch: {} samples, {} angles",
                signal, angles
            ),
            Self::NotchOutOfRange { start, end, len } => write!(
                f,
                "notch range {}..{} out of bounds for {} samples",
                start, end, len
            ),
            Self::NotchNotFound { len } => {
                write!(f, "no zero-level sample among {} samples", len)
            }
        }
    }
}

impl std::error::Error for EncodingError {}
