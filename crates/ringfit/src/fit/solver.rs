use nalgebra::{Matrix4, Vector4};

use super::residual::{normal_equations, NormalEquations};
use super::{FitConfig, Termination};

/// Smallest damping factor reached after a run of accepted steps.
const MIN_DAMPING: f64 = 1e-15;
/// Diagonal floor for Marquardt scaling on parameters with no curvature.
const MIN_DIAG: f64 = 1e-12;

#[derive(Debug, Clone)]
pub(super) struct LmOutcome {
    pub params: Vector4<f64>,
    pub cost: f64,
    pub iterations: usize,
    pub termination: Termination,
}

/// Solve `(JᵀJ + λ·diag(JᵀJ)) δ = −Jᵀr`.
fn damped_step(ne: &NormalEquations, lambda: f64) -> Option<Vector4<f64>> {
    let mut a: Matrix4<f64> = ne.jtj;
    for k in 0..4 {
        a[(k, k)] += lambda * ne.jtj[(k, k)].max(MIN_DIAG);
    }
    let rhs = -ne.jtr;
    let step = match a.cholesky() {
        Some(ch) => ch.solve(&rhs),
        None => a.lu().solve(&rhs)?,
    };
    step.iter().all(|v| v.is_finite()).then_some(step)
}

pub(super) fn levenberg_marquardt(
    initial: Vector4<f64>,
    points: &[[f64; 2]],
    angles: &[f64],
    config: &FitConfig,
) -> LmOutcome {
    let mut params = initial;
    let mut ne = normal_equations(&params, points, angles);
    let mut lambda = config.initial_damping.max(MIN_DAMPING);
    let mut iterations = 0usize;

    let termination = loop {
        if ne.cost <= config.cost_floor {
            break Termination::ResidualVanished;
        }
        if ne.jtr.amax() <= config.gtol {
            break Termination::GradientVanished;
        }
        if iterations >= config.max_iters {
            break Termination::MaxIterations;
        }
        iterations += 1;

        let Some(step) = damped_step(&ne, lambda) else {
            lambda *= 10.0;
            if lambda > config.max_damping {
                break Termination::Stalled;
            }
            continue;
        };
        let step_is_small = step.norm() <= config.xtol * (params.norm() + config.xtol);

        let candidate = params + step;
        let next = normal_equations(&candidate, points, angles);

        if next.cost.is_finite() && next.cost < ne.cost {
            let reduction = ne.cost - next.cost;
            let previous = ne.cost;
            params = candidate;
            ne = next;
            lambda = (lambda * 0.1).max(MIN_DAMPING);
            tracing::trace!(
                iteration = iterations,
                cost = ne.cost,
                lambda,
                "lm step accepted"
            );
            if reduction <= config.ftol * previous {
                break Termination::CostConverged;
            }
            if step_is_small {
                break Termination::StepConverged;
            }
        } else {
            if step_is_small {
                break Termination::StepConverged;
            }
            lambda *= 10.0;
            tracing::trace!(
                iteration = iterations,
                cost = next.cost,
                lambda,
                "lm step rejected"
            );
            if lambda > config.max_damping {
                break Termination::Stalled;
            }
        }
    };

    LmOutcome {
        params,
        cost: ne.cost,
        iterations,
        termination,
    }
}
