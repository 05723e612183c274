use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::angles::AngleSample;
use crate::encoding::{
    align_to_notch, sector_boundaries, step_signal, AlignedSignal, SignalLevels, StepSignal,
};
use crate::render::{Figure, PlotSink, Rgb, Series};

use super::{DemoError, PlotWindow};

const X_LABEL: &str = "Angular distance along perimeter";
const Y_LABEL: &str = "Image value";

/// Parameters of the angular encoding demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingDemoConfig {
    /// Samples over one turn.
    pub n_samples: usize,
    /// First sample index of the notch.
    pub notch_start: usize,
    /// Notch length in samples.
    pub notch_len: usize,
    pub levels: SignalLevels,
    /// Code sectors marked on the rotated plot.
    pub n_sectors: usize,
    pub plot: PlotWindow,
    /// Vertical extent of the sector divider lines.
    pub sector_line_range: [f64; 2],
    pub raw_output_file: String,
    pub rotated_output_file: String,
}

impl Default for EncodingDemoConfig {
    fn default() -> Self {
        Self {
            n_samples: 144,
            notch_start: 60,
            notch_len: 12,
            levels: SignalLevels::default(),
            n_sectors: 12,
            plot: PlotWindow {
                width_px: 600,
                height_px: 300,
                x_range: [0.0, TAU],
                y_range: [-50.0, 400.0],
            },
            sector_line_range: [-50.0, 300.0],
            raw_output_file: "encoding-demo.png".to_string(),
            rotated_output_file: "encoding-demo-rotated.png".to_string(),
        }
    }
}

/// Outcome of the encoding demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingDemoReport {
    /// Notch start index in the raw signal.
    pub offset: usize,
    /// Angle of the notch start in the raw signal.
    pub notch_angle: f64,
    pub raw_image: PathBuf,
    pub rotated_image: PathBuf,
    /// Channels and angles after rotation.
    pub aligned: AlignedSignal,
}

/// Plot both channels of `signal` against `angles`.
pub fn signal_figure(window: &PlotWindow, angles: &[f64], signal: &StepSignal) -> Figure {
    let mut fig = Figure::new(
        window.width_px,
        window.height_px,
        window.x_range,
        window.y_range,
    )
    .with_axis_labels(X_LABEL, Y_LABEL);

    let trace = |values: &[f64]| -> Vec<[f64; 2]> {
        angles.iter().zip(values).map(|(&t, &v)| [t, v]).collect()
    };
    let outer = trace(signal.outer.as_slice());
    let inner = trace(signal.inner.as_slice());
    fig.push(Series::line(outer, Rgb::CYCLE_RED).with_label("Outer ellipse"));
    fig.push(Series::line(inner, Rgb::CYCLE_BLUE).with_label("Inner ellipse"));
    fig
}

/// Synthesize the code signal, align it to its notch and save both plots.
///
/// The rotated plot keeps the unrotated angle axis, so the notch appears at
/// the left edge followed by the sector dividers.
pub fn run_encoding_demo(
    config: &EncodingDemoConfig,
    out_dir: &Path,
    sink: &mut dyn PlotSink,
) -> Result<EncodingDemoReport, DemoError> {
    let angles = AngleSample::full_turn(config.n_samples);
    let notch = config.notch_start..config.notch_start.saturating_add(config.notch_len);
    let signal = step_signal(&angles, notch, config.levels)?;

    let raw_image = out_dir.join(&config.raw_output_file);
    sink.save(&signal_figure(&config.plot, &angles, &signal), &raw_image)?;

    let aligned = align_to_notch(&signal, &angles)?;
    tracing::info!(
        "Notch starts at index {} ({:.4} rad); rotated by {} samples",
        aligned.offset,
        aligned.notch_angle,
        aligned.offset
    );

    let mut rotated = signal_figure(&config.plot, &angles, &aligned.signal);
    let [y0, y1] = config.sector_line_range;
    rotated.push_vertical_lines(&sector_boundaries(config.n_sectors), y0, y1, Rgb::GRAY);
    let rotated_image = out_dir.join(&config.rotated_output_file);
    sink.save(&rotated, &rotated_image)?;

    Ok(EncodingDemoReport {
        offset: aligned.offset,
        notch_angle: aligned.notch_angle,
        raw_image,
        rotated_image,
        aligned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoError;
    use crate::encoding::EncodingError;
    use crate::test_utils::RecordingSink;

    #[test]
    fn default_run_rotates_notch_to_start() {
        let mut sink = RecordingSink::default();
        let report = run_encoding_demo(&EncodingDemoConfig::default(), Path::new("out"), &mut sink)
            .expect("demo run");

        assert_eq!(report.offset, 60);
        let aligned = &report.aligned;
        assert_eq!(aligned.signal.outer[0], 0.0);
        assert_eq!(aligned.signal.outer[11], 0.0);
        assert_eq!(aligned.signal.outer[12], 255.0);

        assert_eq!(sink.saved.len(), 2);
        assert_eq!(sink.saved[0].0, Path::new("out").join("encoding-demo.png"));
        assert_eq!(
            sink.saved[1].0,
            Path::new("out").join("encoding-demo-rotated.png")
        );

        let raw = &sink.saved[0].1;
        assert_eq!(raw.series.len(), 2);
        assert_eq!(raw.x_label.as_deref(), Some(X_LABEL));
        assert_eq!(raw.legend_labels(), vec!["Outer ellipse", "Inner ellipse"]);

        // Two channels plus 13 sector dividers.
        let rotated = &sink.saved[1].1;
        assert_eq!(rotated.series.len(), 2 + 13);
        assert_eq!(rotated.series[1].points[0], [0.0, 255.0]);
    }

    #[test]
    fn notch_outside_signal_aborts_before_saving() {
        let mut sink = RecordingSink::default();
        let cfg = EncodingDemoConfig {
            notch_start: 140,
            ..EncodingDemoConfig::default()
        };
        let err = run_encoding_demo(&cfg, Path::new("."), &mut sink).unwrap_err();
        assert!(matches!(
            err,
            DemoError::Encoding(EncodingError::NotchOutOfRange { .. })
        ));
        assert!(sink.saved.is_empty());
    }

    #[test]
    fn empty_notch_has_nothing_to_align() {
        let mut sink = RecordingSink::default();
        let cfg = EncodingDemoConfig {
            notch_len: 0,
            ..EncodingDemoConfig::default()
        };
        let err = run_encoding_demo(&cfg, Path::new("."), &mut sink).unwrap_err();
        assert!(matches!(
            err,
            DemoError::Encoding(EncodingError::NotchNotFound { len: 144 })
        ));
        // The raw plot is written before alignment is attempted.
        assert_eq!(sink.saved.len(), 1);
    }
}
