//! The two demo pipelines: generate data, fit or align, build figures, save.

mod ellipse;
mod encoding;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoding::EncodingError;
use crate::fit::FitError;
use crate::render::RenderError;

pub use ellipse::{ellipse_figure, run_ellipse_demo, EllipseDemoConfig, EllipseDemoReport};
pub use encoding::{
    run_encoding_demo, signal_figure, EncodingDemoConfig, EncodingDemoReport,
};

/// Pixel size and data window of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotWindow {
    pub width_px: u32,
    /// Ignored by equal-aspect figures such as the ellipse plot, whose
    /// height follows from `width_px` and the data window.
    pub height_px: u32,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
}

/// Configuration for both demos, loadable from JSON.
///
/// Every field falls back to the built-in demo constants when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub ellipse: EllipseDemoConfig,
    pub encoding: EncodingDemoConfig,
}

impl DemoConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Errors that abort a demo run.
#[derive(Debug)]
pub enum DemoError {
    /// Fitting one of the data sets failed.
    Fit {
        /// Which data set was being fitted.
        dataset: &'static str,
        source: FitError,
    },
    Encoding(EncodingError),
    Render(RenderError),
}

impl std::fmt::Display for DemoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fit { dataset, source } => write!(f, "{} fit: {}", dataset, source),
            Self::Encoding(e) => write!(f, "encoding: {}", e),
            Self::Render(e) => write!(f, "render: {}", e),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fit { source, .. } => Some(source),
            Self::Encoding(e) => Some(e),
            Self::Render(e) => Some(e),
        }
    }
}

impl From<EncodingError> for DemoError {
    fn from(e: EncodingError) -> Self {
        Self::Encoding(e)
    }
}

impl From<RenderError> for DemoError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PngRenderer;

    #[test]
    fn partial_json_keeps_defaults() {
        let raw = r#"{ "ellipse": { "n_samples": 33 }, "encoding": { "notch_start": 10 } }"#;
        let cfg: DemoConfig = serde_json::from_str(raw).expect("valid json");
        assert_eq!(cfg.ellipse.n_samples, 33);
        assert_eq!(cfg.ellipse.curve_samples, 200);
        assert_eq!(cfg.ellipse.fit.max_iters, 200);
        assert_eq!(cfg.encoding.notch_start, 10);
        assert_eq!(cfg.encoding.notch_len, 12);
    }

    #[test]
    fn empty_json_is_default() {
        let cfg: DemoConfig = serde_json::from_str("{}").expect("valid json");
        assert_eq!(cfg.ellipse.output_file, "output.png");
        assert_eq!(cfg.encoding.n_samples, 144);
    }

    #[test]
    fn config_roundtrips_through_file() {
        let dir = std::env::temp_dir().join(format!("ringfit-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("demo.json");
        let mut cfg = DemoConfig::default();
        cfg.encoding.n_sectors = 16;
        std::fs::write(&path, serde_json::to_string_pretty(&cfg).expect("serialize"))
            .expect("write");
        let loaded = DemoConfig::from_json_file(&path).expect("load");
        assert_eq!(loaded.encoding.n_sectors, 16);
        assert!(DemoConfig::from_json_file(&dir.join("missing.json")).is_err());
        let _ = std::fs::remove_file(&path);
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ringfit-demo-{}-{}", name, std::process::id()))
    }

    #[test]
    fn both_demos_write_decodable_pngs() {
        let out_dir = scratch_dir("pngs");
        let cfg = DemoConfig::default();
        let mut renderer = PngRenderer::new();

        let ellipse = run_ellipse_demo(&cfg.ellipse, &out_dir, &mut renderer).expect("ellipse");
        let encoding =
            run_encoding_demo(&cfg.encoding, &out_dir, &mut renderer).expect("encoding");

        for path in [&ellipse.image, &encoding.raw_image, &encoding.rotated_image] {
            assert!(path.exists(), "{} missing", path.display());
            let img = image::open(path).expect("decodable png");
            assert!(img.width() > 0 && img.height() > 0);
        }
        assert_eq!(ellipse.image, out_dir.join("output.png"));
        assert_eq!(encoding.raw_image, out_dir.join("encoding-demo.png"));
        assert_eq!(encoding.rotated_image, out_dir.join("encoding-demo-rotated.png"));
        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[test]
    fn unwritable_out_dir_is_a_render_error() {
        let base = scratch_dir("blocked");
        std::fs::create_dir_all(&base).expect("temp dir");
        let blocker = base.join("not-a-dir");
        std::fs::write(&blocker, b"file").expect("write blocker");
        let out_dir = blocker.join("plots");

        let cfg = DemoConfig::default();
        let err = run_ellipse_demo(&cfg.ellipse, &out_dir, &mut PngRenderer::new()).unwrap_err();
        assert!(
            matches!(err, DemoError::Render(RenderError::Io { ref path, .. }) if path == &out_dir),
            "unexpected error: {}",
            err
        );
        let err =
            run_encoding_demo(&cfg.encoding, &out_dir, &mut PngRenderer::new()).unwrap_err();
        assert!(matches!(err, DemoError::Render(RenderError::Io { .. })));
        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn demo_error_chains_source() {
        use std::error::Error;
        let err = DemoError::from(EncodingError::NotchNotFound { len: 4 });
        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "encoding: no zero-level sample among 4 samples"
        );
    }
}
