//! Backend-neutral figure description and the sink that writes it out.
//!
//! Pipelines build a [`Figure`] (labeled series plus styling) and hand it
//! to a [`PlotSink`]. The numerical code never touches a drawing backend,
//! so it can be tested with a recording sink.

mod png;

use std::path::{Path, PathBuf};

pub use png::PngRenderer;

/// Outer margin of the chart area, in pixels.
pub(crate) const MARGIN_PX: u32 = 12;
/// Height reserved below the plot for x tick labels and description.
pub(crate) const X_LABEL_AREA_PX: u32 = 40;
/// Width reserved left of the plot for y tick labels and description.
pub(crate) const Y_LABEL_AREA_PX: u32 = 50;

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 128, 0);
    pub const GRAY: Self = Self::new(128, 128, 128);
    /// First two colors of the ggplot cycle.
    pub const CYCLE_RED: Self = Self::new(0xE2, 0x4A, 0x33);
    pub const CYCLE_BLUE: Self = Self::new(0x34, 0x8A, 0xBD);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesStyle {
    /// Polyline through the points in order.
    Line { color: Rgb, width: u32, dashed: bool },
    /// Filled circle per point.
    Scatter { color: Rgb, radius: u32 },
}

/// One drawable data series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend entry; unlabeled series stay out of the legend.
    pub label: Option<String>,
    pub points: Vec<[f64; 2]>,
    pub style: SeriesStyle,
}

impl Series {
    pub fn line(points: Vec<[f64; 2]>, color: Rgb) -> Self {
        Self {
            label: None,
            points,
            style: SeriesStyle::Line {
                color,
                width: 1,
                dashed: false,
            },
        }
    }

    pub fn dashed(points: Vec<[f64; 2]>, color: Rgb) -> Self {
        Self {
            label: None,
            points,
            style: SeriesStyle::Line {
                color,
                width: 1,
                dashed: true,
            },
        }
    }

    pub fn scatter(points: Vec<[f64; 2]>, color: Rgb, radius: u32) -> Self {
        Self {
            label: None,
            points,
            style: SeriesStyle::Scatter { color, radius },
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A single 2D chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width_px: u32,
    pub height_px: u32,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Derive the height from the width so both axes share one scale.
    pub equal_aspect: bool,
    pub legend: bool,
    /// Drawn in order; later series paint over earlier ones.
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(width_px: u32, height_px: u32, x_range: [f64; 2], y_range: [f64; 2]) -> Self {
        Self {
            width_px,
            height_px,
            x_range,
            y_range,
            x_label: None,
            y_label: None,
            equal_aspect: false,
            legend: true,
            series: Vec::new(),
        }
    }

    pub fn with_axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }

    pub fn with_equal_aspect(mut self) -> Self {
        self.equal_aspect = true;
        self
    }

    pub fn push(&mut self, series: Series) {
        self.series.push(series);
    }

    /// Unlabeled vertical segments from `y0` to `y1` at each `x`.
    pub fn push_vertical_lines(&mut self, xs: &[f64], y0: f64, y1: f64, color: Rgb) {
        for &x in xs {
            self.push(Series::line(vec![[x, y0], [x, y1]], color));
        }
    }

    pub fn legend_labels(&self) -> Vec<&str> {
        self.series
            .iter()
            .filter_map(|s| s.label.as_deref())
            .collect()
    }

    /// Canvas size in pixels after applying the aspect constraint.
    pub fn canvas_size(&self) -> (u32, u32) {
        let x_span = self.x_range[1] - self.x_range[0];
        let y_span = self.y_range[1] - self.y_range[0];
        let chrome_w = Y_LABEL_AREA_PX + 2 * MARGIN_PX;
        if !self.equal_aspect || !(x_span > 0.0 && y_span > 0.0) || self.width_px <= chrome_w {
            return (self.width_px, self.height_px);
        }
        let plot_w = f64::from(self.width_px - chrome_w);
        let plot_h = (plot_w * y_span / x_span).round() as u32;
        (self.width_px, plot_h + X_LABEL_AREA_PX + 2 * MARGIN_PX)
    }
}

/// Split a polyline into dashes of `on` segments separated by `off`
/// skipped segments.
pub(crate) fn dash_segments(points: &[[f64; 2]], on: usize, off: usize) -> Vec<Vec<[f64; 2]>> {
    let on = on.max(1);
    let mut out = Vec::new();
    let mut i = 0;
    while i + 1 < points.len() {
        let end = (i + on).min(points.len() - 1);
        out.push(points[i..=end].to_vec());
        i += on + off;
    }
    out
}

/// Errors raised while writing a figure.
#[derive(Debug)]
pub enum RenderError {
    /// Output directory could not be created.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Drawing backend failed.
    Draw(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot prepare {}: {}", path.display(), source)
            }
            Self::Draw(msg) => write!(f, "drawing failed: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Draw(_) => None,
        }
    }
}

/// Destination for finished figures.
pub trait PlotSink {
    /// Write `figure` to `path`, replacing any existing file.
    fn save(&mut self, figure: &Figure, path: &Path) -> Result<(), RenderError>;
}
