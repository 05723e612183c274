use nalgebra::{Matrix4, Vector4};

/// Gauss-Newton system accumulated over all samples at one parameter vector.
#[derive(Debug, Clone)]
pub(super) struct NormalEquations {
    /// `JᵀJ`
    pub jtj: Matrix4<f64>,
    /// `Jᵀr`
    pub jtr: Vector4<f64>,
    /// Sum of squared residuals.
    pub cost: f64,
}

/// Offset between observed point and model point, and its length.
///
/// Parameters are ordered `(cx, cy, a, b)`.
#[inline]
fn offset(params: &Vector4<f64>, point: [f64; 2], theta: f64) -> ([f64; 2], f64) {
    let (s, c) = theta.sin_cos();
    let ex = point[0] - (params[2] * s + params[0]);
    let ey = point[1] - (params[3] * c + params[1]);
    ([ex, ey], (ex * ex + ey * ey).sqrt())
}

/// Euclidean residual of one sample.
#[inline]
pub(super) fn residual(params: &Vector4<f64>, point: [f64; 2], theta: f64) -> f64 {
    offset(params, point, theta).1
}

/// Jacobian row of one residual, or `None` when the residual is exactly zero
/// and the distance has no defined direction.
#[inline]
pub(super) fn jacobian_row(
    params: &Vector4<f64>,
    point: [f64; 2],
    theta: f64,
) -> Option<Vector4<f64>> {
    let ([ex, ey], dist) = offset(params, point, theta);
    if dist <= 0.0 || !dist.is_finite() {
        return None;
    }
    let ux = ex / dist;
    let uy = ey / dist;
    let (s, c) = theta.sin_cos();
    // r = ‖p − f(θ)‖  ⇒  ∂r/∂q = −u · ∂f/∂q
    Some(Vector4::new(-ux, -uy, -ux * s, -uy * c))
}

pub(super) fn cost(params: &Vector4<f64>, points: &[[f64; 2]], angles: &[f64]) -> f64 {
    points
        .iter()
        .zip(angles)
        .map(|(&p, &t)| {
            let r = residual(params, p, t);
            r * r
        })
        .sum()
}

pub(super) fn normal_equations(
    params: &Vector4<f64>,
    points: &[[f64; 2]],
    angles: &[f64],
) -> NormalEquations {
    let mut jtj = Matrix4::<f64>::zeros();
    let mut jtr = Vector4::<f64>::zeros();
    let mut cost = 0.0f64;

    for (&p, &t) in points.iter().zip(angles) {
        let r = residual(params, p, t);
        cost += r * r;
        // Zero-residual samples add nothing to the gradient anyway.
        let Some(j) = jacobian_row(params, p, t) else {
            continue;
        };
        jtj += j * j.transpose();
        jtr += j * r;
    }

    NormalEquations { jtj, jtr, cost }
}
