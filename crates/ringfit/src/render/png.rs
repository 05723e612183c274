use std::path::Path;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use super::{
    dash_segments, Figure, PlotSink, RenderError, Rgb, SeriesStyle, MARGIN_PX, X_LABEL_AREA_PX,
    Y_LABEL_AREA_PX,
};

/// Samples per drawn dash and per gap in dashed lines.
const DASH_ON: usize = 3;
const DASH_OFF: usize = 2;
const LEGEND_SWATCH_PX: i32 = 20;

/// Family every text element is drawn with; the bundled face is registered
/// under this name.
const FONT_FAMILY: &str = "sans-serif";
const TICK_FONT_PX: u32 = 12;
const DESC_FONT_PX: u32 = 14;
const LEGEND_FONT_PX: u32 = 13;

static FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Register the bundled font with plotters once per process.
fn ensure_font() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| {
        register_font(FONT_FAMILY, FontStyle::Normal, FONT_DATA).is_ok()
    });
    if ok {
        Ok(())
    } else {
        Err(RenderError::Draw("bundled font could not be parsed".to_string()))
    }
}

/// Rasterizes figures to PNG files with plotters' bitmap backend.
///
/// Text (ticks, axis descriptions, legend) is set in a bundled DejaVu Sans
/// face, so rendering does not depend on system fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngRenderer;

impl PngRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PlotSink for PngRenderer {
    fn save(&mut self, figure: &Figure, path: &Path) -> Result<(), RenderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        ensure_font()?;
        draw_figure(figure, path).map_err(|e| RenderError::Draw(e.to_string()))?;
        tracing::info!("Figure written to {}", path.display());
        Ok(())
    }
}

#[inline]
fn backend_color(c: Rgb) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

fn draw_figure(figure: &Figure, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = figure.canvas_size();
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let [x0, x1] = figure.x_range;
    let [y0, y1] = figure.y_range;
    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN_PX)
        .x_label_area_size(X_LABEL_AREA_PX)
        .y_label_area_size(Y_LABEL_AREA_PX)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.label_style((FONT_FAMILY, TICK_FONT_PX))
            .axis_desc_style((FONT_FAMILY, DESC_FONT_PX));
        if let Some(label) = &figure.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &figure.y_label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw()?;
    }

    for series in &figure.series {
        match series.style {
            SeriesStyle::Line {
                color,
                width,
                dashed,
            } => {
                let style = backend_color(color).stroke_width(width.max(1));
                let pieces = if dashed {
                    dash_segments(&series.points, DASH_ON, DASH_OFF)
                } else {
                    vec![series.points.clone()]
                };
                let anno = chart.draw_series(pieces.into_iter().map(|piece| {
                    PathElement::new(
                        piece.into_iter().map(|[x, y]| (x, y)).collect::<Vec<_>>(),
                        style,
                    )
                }))?;
                if let Some(label) = &series.label {
                    anno.label(label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + LEGEND_SWATCH_PX, y)], style)
                    });
                }
            }
            SeriesStyle::Scatter { color, radius } => {
                let fill = backend_color(color).filled();
                let anno = chart.draw_series(
                    series
                        .points
                        .iter()
                        .map(|&[x, y]| Circle::new((x, y), radius, fill)),
                )?;
                if let Some(label) = &series.label {
                    anno.label(label.as_str()).legend(move |(x, y)| {
                        Circle::new((x + LEGEND_SWATCH_PX / 2, y), radius, fill)
                    });
                }
            }
        }
    }

    if figure.legend && !figure.legend_labels().is_empty() {
        chart
            .configure_series_labels()
            .label_font((FONT_FAMILY, LEGEND_FONT_PX))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
