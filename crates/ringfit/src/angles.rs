//! Evenly spaced angular positions around a perimeter.

use std::f64::consts::TAU;
use std::ops::Deref;

/// Ordered angular positions (radians), fixed once generated.
///
/// The order is the traversal order around the perimeter; samples, residuals
/// and signal values are all indexed in parallel with it.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSample(Vec<f64>);

impl AngleSample {
    /// `n` angles over the half-open turn `[0, 2π)` with step `2π / n`.
    pub fn full_turn(n: usize) -> Self {
        let step = if n == 0 { 0.0 } else { TAU / n as f64 };
        Self((0..n).map(|i| i as f64 * step).collect())
    }

    /// `n` angles over the closed turn `[0, 2π]`, endpoint included.
    ///
    /// Used for drawing curves that must close on themselves.
    pub fn closed_turn(n: usize) -> Self {
        Self::linspace(0.0, TAU, n)
    }

    /// `n` evenly spaced values from `start` to `end` inclusive.
    pub fn linspace(start: f64, end: f64, n: usize) -> Self {
        match n {
            0 => Self(Vec::new()),
            1 => Self(vec![start]),
            _ => {
                let step = (end - start) / (n - 1) as f64;
                let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
                // Pin the endpoint so accumulated rounding never overshoots it.
                values[n - 1] = end;
                Self(values)
            }
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for AngleSample {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl AsRef<[f64]> for AngleSample {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}
