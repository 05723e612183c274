use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::angles::AngleSample;
use crate::curve::{concave_curve, convex_curve, CurveNotch, EllipseParams};
use crate::fit::{fit_ellipse, EllipseFit, FitConfig, FitError};
use crate::render::{Figure, PlotSink, Rgb, Series};

use super::{DemoError, PlotWindow};

const DATA_RADIUS_PX: u32 = 3;
const CENTER_RADIUS_PX: u32 = 4;

/// Parameters of the ellipse fitting demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipseDemoConfig {
    /// Ellipse the convex and concave data are generated from.
    pub truth: EllipseParams,
    /// Data samples over one turn.
    pub n_samples: usize,
    /// Dent applied to the concave data.
    pub notch: CurveNotch,
    /// Starting point for both fits.
    pub initial_guess: EllipseParams,
    pub fit: FitConfig,
    /// Samples used to draw each fitted curve.
    pub curve_samples: usize,
    /// Abort when a fit does not converge; otherwise warn and plot it.
    pub require_convergence: bool,
    pub plot: PlotWindow,
    /// File name written inside the output directory.
    pub output_file: String,
}

impl Default for EllipseDemoConfig {
    fn default() -> Self {
        Self {
            truth: EllipseParams::new(5.0, 4.0, 3.0, 2.5),
            n_samples: 21,
            notch: CurveNotch::default(),
            initial_guess: EllipseParams::new(0.0, 0.0, 1.0, 1.0),
            fit: FitConfig::default(),
            curve_samples: 200,
            require_convergence: true,
            plot: PlotWindow {
                width_px: 640,
                height_px: 640,
                x_range: [1.5, 8.5],
                y_range: [1.0, 8.5],
            },
            output_file: "output.png".to_string(),
        }
    }
}

/// Outcome of the ellipse fitting demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EllipseDemoReport {
    pub convex: EllipseFit,
    pub concave: EllipseFit,
    pub image: PathBuf,
}

fn fit_dataset(
    dataset: &'static str,
    points: &[[f64; 2]],
    angles: &[f64],
    config: &EllipseDemoConfig,
) -> Result<EllipseFit, DemoError> {
    match fit_ellipse(&config.initial_guess, points, angles, &config.fit) {
        Ok(fit) => {
            tracing::info!(
                "{} fit: center=({:.4}, {:.4}) axes=({:.4}, {:.4}) rms={:.3e} [{}]",
                dataset,
                fit.params.cx,
                fit.params.cy,
                fit.params.a,
                fit.params.b,
                fit.rms,
                fit.termination
            );
            Ok(fit)
        }
        Err(FitError::NotConverged { fit }) if !config.require_convergence => {
            tracing::warn!(
                "{} fit did not converge ({} after {} iterations); plotting unreliable parameters",
                dataset,
                fit.termination,
                fit.iterations
            );
            Ok(fit)
        }
        Err(source) => Err(DemoError::Fit { dataset, source }),
    }
}

/// Build the comparison figure: data, fitted curves and fitted centers.
pub fn ellipse_figure(
    config: &EllipseDemoConfig,
    convex_points: &[[f64; 2]],
    concave_points: &[[f64; 2]],
    convex_fit: &EllipseFit,
    concave_fit: &EllipseFit,
) -> Figure {
    let curve = AngleSample::closed_turn(config.curve_samples);
    let w = &config.plot;
    let mut fig = Figure::new(w.width_px, w.height_px, w.x_range, w.y_range).with_equal_aspect();

    fig.push(Series::scatter(convex_points.to_vec(), Rgb::RED, DATA_RADIUS_PX));
    fig.push(
        Series::line(convex_fit.params.sample(&curve), Rgb::RED).with_label("Fit to convex data"),
    );
    fig.push(Series::scatter(
        vec![convex_fit.params.center()],
        Rgb::RED,
        CENTER_RADIUS_PX,
    ));

    fig.push(Series::scatter(concave_points.to_vec(), Rgb::GREEN, DATA_RADIUS_PX));
    fig.push(
        Series::dashed(concave_fit.params.sample(&curve), Rgb::GREEN)
            .with_label("Fit to concave data"),
    );
    fig.push(Series::scatter(
        vec![concave_fit.params.center()],
        Rgb::GREEN,
        CENTER_RADIUS_PX,
    ));

    fig
}

/// Fit convex and dented data independently and save the comparison plot.
pub fn run_ellipse_demo(
    config: &EllipseDemoConfig,
    out_dir: &Path,
    sink: &mut dyn PlotSink,
) -> Result<EllipseDemoReport, DemoError> {
    let angles = AngleSample::full_turn(config.n_samples);
    let center = config.truth.center();
    let axes = config.truth.semi_axes();

    let convex_points = convex_curve(&angles, center, axes);
    let concave_points = concave_curve(&angles, center, axes, &config.notch);
    tracing::info!(
        "Generated {} samples per data set (notch span {:.4} rad, scale {})",
        angles.len(),
        config.notch.span,
        config.notch.scale
    );

    let convex = fit_dataset("convex", &convex_points, &angles, config)?;
    let concave = fit_dataset("concave", &concave_points, &angles, config)?;

    let figure = ellipse_figure(config, &convex_points, &concave_points, &convex, &concave);
    let image = out_dir.join(&config.output_file);
    sink.save(&figure, &image)?;

    Ok(EllipseDemoReport {
        convex,
        concave,
        image,
    })
}
