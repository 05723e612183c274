//! ringfit: perimeter model fitting and angular code alignment.
//!
//! Two small pipelines over shared primitives:
//!
//! 1. **Ellipse fit** – sample a convex ellipse and a copy dented by an
//!    angular notch, fit the parametric ellipse model to each by
//!    Levenberg–Marquardt on Euclidean residuals, and plot both fits.
//! 2. **Encoding** – synthesize a two-channel code-band signal with one
//!    inverted run, find where the run starts, and rotate the samples so it
//!    begins at index 0.
//!
//! # Public API
//! - [`AngleSample`] and the curve generators in [`curve`]
//! - [`fit_ellipse`] with [`FitConfig`] / [`EllipseFit`] / [`FitError`]
//! - notch detection and rotation in [`encoding`]
//! - the [`Figure`] model, the [`PlotSink`] trait and [`PngRenderer`]
//! - [`run_ellipse_demo`] and [`run_encoding_demo`]

mod angles;
pub mod curve;
mod demo;
pub mod encoding;
mod fit;
pub mod render;

#[cfg(test)]
mod test_utils;

pub use angles::AngleSample;
pub use curve::{concave_curve, convex_curve, CurveNotch, EllipseParams};
pub use demo::{
    ellipse_figure, run_ellipse_demo, run_encoding_demo, signal_figure, DemoConfig, DemoError,
    EllipseDemoConfig, EllipseDemoReport, EncodingDemoConfig, EncodingDemoReport, PlotWindow,
};
pub use encoding::{
    align_to_notch, find_notch_start, rotate, step_signal, AlignedSignal, EncodingError,
    SignalLevels, StepSignal,
};
pub use fit::{
    fit_ellipse, sum_squared_residuals, EllipseFit, FitConfig, FitError, Termination,
    MIN_FIT_POINTS,
};
pub use render::{Figure, PlotSink, PngRenderer, RenderError, Rgb, Series, SeriesStyle};
