//! Parametric ellipse fitting by nonlinear least squares.
//!
//! Observed points are matched to the model at known angles, so sample `i`
//! is compared against `f(θᵢ)` under the candidate parameters. Each residual
//! is the Euclidean distance between the two, and the solver minimizes the
//! sum of their squares with Levenberg–Marquardt.
//!
//! The distance residual is non-negative and not differentiable where it
//! reaches zero. Samples that land exactly on the model drop out of the
//! Jacobian; an exact fit is detected through [`FitConfig::cost_floor`].

mod residual;
mod solver;

use serde::{Deserialize, Serialize};

use crate::curve::EllipseParams;

/// Minimum number of samples: one per free parameter.
pub const MIN_FIT_POINTS: usize = 4;

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors returned by [`fit_ellipse`].
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// Fewer samples than free parameters.
    TooFewPoints {
        /// Required minimum number of points.
        needed: usize,
        /// Provided number of points.
        got: usize,
    },
    /// Point and angle sequences are not parallel.
    LengthMismatch {
        /// Number of observed points.
        points: usize,
        /// Number of angles.
        angles: usize,
    },
    /// NaN or infinity in the initial guess, the points or the angles.
    NonFiniteInput,
    /// The solver stopped without meeting a convergence test.
    ///
    /// `fit` holds the best parameters reached; they are not reliable.
    NotConverged {
        /// Last accepted state of the solver.
        fit: EllipseFit,
    },
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewPoints { needed, got } => {
                write!(f, "too few points: need {}, got {}", needed, got)
            }
            Self::LengthMismatch { points, angles } => {
                write!(
                    f,
                    "point/angle length mismatch: {} points, {} angles",
                    points, angles
                )
            }
            Self::NonFiniteInput => f.write_str("non-finite value in fit input"),
            Self::NotConverged { fit } => write!(
                f,
                "fit did not converge ({}) after {} iterations, cost {:.3e}",
                fit.termination, fit.iterations, fit.cost
            ),
        }
    }
}

impl std::error::Error for FitError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Stopping criteria and damping schedule for the solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Maximum number of damped steps attempted (accepted or rejected).
    pub max_iters: usize,
    /// Stop when an accepted step lowers the cost by less than
    /// `ftol × cost`.
    pub ftol: f64,
    /// Stop when the step is shorter than `xtol × (‖params‖ + xtol)`.
    pub xtol: f64,
    /// Stop when every component of `Jᵀr` is at most `gtol` in magnitude.
    pub gtol: f64,
    /// Cost at or below which the data is considered fitted exactly.
    pub cost_floor: f64,
    /// Initial Marquardt damping factor.
    pub initial_damping: f64,
    /// Give up once the damping factor grows past this without progress.
    pub max_damping: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iters: 200,
            ftol: 1.49e-8,
            xtol: 1.49e-8,
            gtol: 1e-10,
            cost_floor: 1e-20,
            initial_damping: 1e-3,
            max_damping: 1e16,
        }
    }
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Cost fell to [`FitConfig::cost_floor`].
    ResidualVanished,
    /// Relative cost reduction fell below [`FitConfig::ftol`].
    CostConverged,
    /// Step length fell below [`FitConfig::xtol`].
    StepConverged,
    /// Gradient fell below [`FitConfig::gtol`].
    GradientVanished,
    /// Iteration budget exhausted.
    MaxIterations,
    /// Damping grew past [`FitConfig::max_damping`] with no descent step.
    Stalled,
}

impl Termination {
    pub const fn is_converged(self) -> bool {
        matches!(
            self,
            Self::ResidualVanished
                | Self::CostConverged
                | Self::StepConverged
                | Self::GradientVanished
        )
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::ResidualVanished => "residual_vanished",
            Self::CostConverged => "cost_converged",
            Self::StepConverged => "step_converged",
            Self::GradientVanished => "gradient_vanished",
            Self::MaxIterations => "max_iterations",
            Self::Stalled => "stalled",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of a converged fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipseFit {
    /// Fitted parameters.
    pub params: EllipseParams,
    /// Sum of squared residuals at `params`.
    pub cost: f64,
    /// Root-mean-square residual at `params`.
    pub rms: f64,
    /// Damped steps attempted.
    pub iterations: usize,
    /// Stopping reason.
    pub termination: Termination,
}

// ── Fitting ────────────────────────────────────────────────────────────────

fn all_finite(points: &[[f64; 2]], angles: &[f64]) -> bool {
    points.iter().all(|p| p[0].is_finite() && p[1].is_finite())
        && angles.iter().all(|t| t.is_finite())
}

/// Fit ellipse parameters to `points` observed at `angles`, starting from
/// `initial`.
///
/// Returns [`FitError::NotConverged`] rather than the raw parameters when
/// no convergence test is met. Calls are independent.
pub fn fit_ellipse(
    initial: &EllipseParams,
    points: &[[f64; 2]],
    angles: &[f64],
    config: &FitConfig,
) -> Result<EllipseFit, FitError> {
    if points.len() != angles.len() {
        return Err(FitError::LengthMismatch {
            points: points.len(),
            angles: angles.len(),
        });
    }
    if points.len() < MIN_FIT_POINTS {
        return Err(FitError::TooFewPoints {
            needed: MIN_FIT_POINTS,
            got: points.len(),
        });
    }
    if !initial.is_finite() || !all_finite(points, angles) {
        return Err(FitError::NonFiniteInput);
    }

    let out = solver::levenberg_marquardt(initial.to_vector(), points, angles, config);
    let fit = EllipseFit {
        params: EllipseParams::from_vector(&out.params),
        cost: out.cost,
        rms: (out.cost / points.len() as f64).sqrt(),
        iterations: out.iterations,
        termination: out.termination,
    };

    tracing::debug!(
        cx = fit.params.cx,
        cy = fit.params.cy,
        a = fit.params.a,
        b = fit.params.b,
        cost = fit.cost,
        iterations = fit.iterations,
        termination = %fit.termination,
        "ellipse fit finished"
    );

    if fit.termination.is_converged() && fit.params.is_finite() {
        Ok(fit)
    } else {
        Err(FitError::NotConverged { fit })
    }
}

/// Sum of squared distance residuals of `points` against the model.
///
/// This is the objective [`fit_ellipse`] minimizes. Pairs beyond the shorter
/// of the two sequences are ignored.
pub fn sum_squared_residuals(params: &EllipseParams, points: &[[f64; 2]], angles: &[f64]) -> f64 {
    residual::cost(&params.to_vector(), points, angles)
}
