//! Shared test utilities for pipeline-level unit tests.

use std::path::{Path, PathBuf};

use crate::render::{Figure, PlotSink, RenderError};

/// Sink that keeps every saved figure in memory instead of drawing it.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub saved: Vec<(PathBuf, Figure)>,
}

impl PlotSink for RecordingSink {
    fn save(&mut self, figure: &Figure, path: &Path) -> Result<(), RenderError> {
        self.saved.push((path.to_path_buf(), figure.clone()));
        Ok(())
    }
}
