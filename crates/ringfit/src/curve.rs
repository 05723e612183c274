//! Parametric perimeter curves used as fitting data and as the fit model.
//!
//! The model is an axis-aligned ellipse traversed from the top:
//!
//! ```text
//! x(θ) = a·sin θ + cx
//! y(θ) = b·cos θ + cy
//! ```
//!
//! The concave variant shrinks both semi-axes inside an angular notch that
//! starts at θ = 0, denting the contour inward.

use nalgebra::Vector4;
use serde::{Deserialize, Serialize};

/// Ellipse model parameters `(cx, cy, a, b)`.
///
/// Signs are unconstrained: a negative semi-axis traces the same curve in
/// the opposite direction, and the fitter is free to land on one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipseParams {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Semi-axis along x.
    pub a: f64,
    /// Semi-axis along y.
    pub b: f64,
}

impl EllipseParams {
    pub const fn new(cx: f64, cy: f64, a: f64, b: f64) -> Self {
        Self { cx, cy, a, b }
    }

    pub fn center(&self) -> [f64; 2] {
        [self.cx, self.cy]
    }

    pub fn semi_axes(&self) -> [f64; 2] {
        [self.a, self.b]
    }

    /// Evaluate the curve at angle `theta`.
    #[inline]
    pub fn point_at(&self, theta: f64) -> [f64; 2] {
        let (s, c) = theta.sin_cos();
        [self.a * s + self.cx, self.b * c + self.cy]
    }

    /// Evaluate the curve at every angle, preserving order.
    pub fn sample(&self, angles: &[f64]) -> Vec<[f64; 2]> {
        angles.iter().map(|&t| self.point_at(t)).collect()
    }

    pub fn is_finite(&self) -> bool {
        self.cx.is_finite() && self.cy.is_finite() && self.a.is_finite() && self.b.is_finite()
    }

    pub(crate) fn to_vector(self) -> Vector4<f64> {
        Vector4::new(self.cx, self.cy, self.a, self.b)
    }

    pub(crate) fn from_vector(v: &Vector4<f64>) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Inward dent applied to the start of the contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveNotch {
    /// Angular extent (radians) of the notch, measured from θ = 0.
    pub span: f64,
    /// Factor applied to both semi-axes inside the notch (< 1 dents inward).
    pub scale: f64,
}

impl CurveNotch {
    /// Half-open membership test `0 ≤ θ < span`.
    #[inline]
    pub fn contains(&self, theta: f64) -> bool {
        (0.0..self.span).contains(&theta)
    }
}

impl Default for CurveNotch {
    fn default() -> Self {
        Self {
            span: std::f64::consts::TAU / 12.0,
            scale: 0.75,
        }
    }
}

/// Points on the ellipse centred at `center` with semi-axes `semi_axes`.
pub fn convex_curve(angles: &[f64], center: [f64; 2], semi_axes: [f64; 2]) -> Vec<[f64; 2]> {
    EllipseParams::new(center[0], center[1], semi_axes[0], semi_axes[1]).sample(angles)
}

/// Like [`convex_curve`], but angles inside `notch` use semi-axes scaled by
/// `notch.scale`.
pub fn concave_curve(
    angles: &[f64],
    center: [f64; 2],
    semi_axes: [f64; 2],
    notch: &CurveNotch,
) -> Vec<[f64; 2]> {
    let outer = EllipseParams::new(center[0], center[1], semi_axes[0], semi_axes[1]);
    let dented = EllipseParams {
        a: outer.a * notch.scale,
        b: outer.b * notch.scale,
        ..outer
    };
    angles
        .iter()
        .map(|&t| {
            if notch.contains(t) {
                dented.point_at(t)
            } else {
                outer.point_at(t)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::AngleSample;
    use approx::assert_relative_eq;

    const CENTER: [f64; 2] = [5.0, 4.0];
    const AXES: [f64; 2] = [3.0, 2.5];

    #[test]
    fn convex_points_satisfy_ellipse_equation() {
        for n in [1usize, 7, 21, 144] {
            let angles = AngleSample::full_turn(n);
            for [x, y] in convex_curve(&angles, CENTER, AXES) {
                let u = (x - CENTER[0]) / AXES[0];
                let v = (y - CENTER[1]) / AXES[1];
                assert_relative_eq!(u * u + v * v, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn convex_curve_starts_at_top() {
        let pts = convex_curve(&[0.0], CENTER, AXES);
        assert_relative_eq!(pts[0][0], 5.0, epsilon = 1e-15);
        assert_relative_eq!(pts[0][1], 6.5, epsilon = 1e-15);
    }

    #[test]
    fn concave_matches_convex_outside_notch_and_scales_inside() {
        let angles = AngleSample::full_turn(21);
        let notch = CurveNotch::default();
        let convex = convex_curve(&angles, CENTER, AXES);
        let concave = concave_curve(&angles, CENTER, AXES, &notch);

        let mut dented = 0;
        for ((&t, p), q) in angles.iter().zip(&convex).zip(&concave) {
            if notch.contains(t) {
                dented += 1;
                // Offsets from the center shrink by exactly the notch scale.
                assert_relative_eq!(q[0] - CENTER[0], (p[0] - CENTER[0]) * 0.75, epsilon = 1e-12);
                assert_relative_eq!(q[1] - CENTER[1], (p[1] - CENTER[1]) * 0.75, epsilon = 1e-12);
            } else {
                assert_eq!(p, q);
            }
        }
        // 2π/21 steps: θ = 0 and θ ≈ 0.299 fall inside [0, π/6).
        assert_eq!(dented, 2);
    }

    #[test]
    fn notch_end_is_excluded() {
        let notch = CurveNotch {
            span: 0.5,
            scale: 0.5,
        };
        assert!(notch.contains(0.0));
        assert!(notch.contains(0.4999));
        assert!(!notch.contains(0.5));
        assert!(!notch.contains(-0.1));

        let pts = concave_curve(&[0.5], CENTER, AXES, &notch);
        assert_eq!(pts, convex_curve(&[0.5], CENTER, AXES));
    }

    #[test]
    fn params_vector_roundtrip_preserves_order() {
        let p = EllipseParams::new(1.0, 2.0, 3.0, 4.0);
        let v = p.to_vector();
        assert_eq!(v[2], 3.0);
        assert_eq!(EllipseParams::from_vector(&v), p);
    }
}
