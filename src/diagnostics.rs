//! Failure snapshots for offline inspection.
//!
//! On an aborted run the raw page markup, a screenshot and a short summary of
//! how far the run got are written to the diagnostics directory. A dumped page
//! can be replayed with `pagefeed convert`.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::browser::RenderedPage;
use crate::pipeline::{PipelineError, RunAborted};

pub const PAGE_FILE: &str = "debug-page.html";
pub const SUMMARY_FILE: &str = "debug-summary.txt";
pub const SCREENSHOT_FILE: &str = "debug-screenshot.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Write snapshots on failure (default: true)
    pub enabled: bool,
    /// Directory receiving the snapshot files (default: current directory)
    pub dir: PathBuf,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("."),
        }
    }
}

pub struct Diagnostics {
    config: DiagnosticsConfig,
}

impl Diagnostics {
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self { config }
    }

    /// Persist whatever is known about a failed run. Returns the written paths.
    ///
    /// Capture problems are logged, never raised: the run has already failed.
    pub fn capture(&self, failure: &RunAborted, page: Option<&RenderedPage>) -> Vec<PathBuf> {
        if !self.config.enabled {
            return Vec::new();
        }

        match self.write_all(failure, page) {
            Ok(paths) => {
                for path in &paths {
                    info!("Saved diagnostics to {}", path.display());
                }
                paths
            }
            Err(e) => {
                warn!(
                    "Failed to write diagnostics to {}: {}",
                    self.config.dir.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn write_all(
        &self,
        failure: &RunAborted,
        page: Option<&RenderedPage>,
    ) -> std::io::Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.config.dir)?;
        let mut written = Vec::new();

        let summary_path = self.config.dir.join(SUMMARY_FILE);
        fs::write(&summary_path, summary(failure, page))?;
        written.push(summary_path);

        if let Some(page) = page {
            let page_path = self.config.dir.join(PAGE_FILE);
            fs::write(&page_path, &page.markup)?;
            written.push(page_path);

            if let Some(ref png) = page.screenshot {
                let shot_path = self.config.dir.join(SCREENSHOT_FILE);
                fs::write(&shot_path, png)?;
                written.push(shot_path);
            }
        }

        Ok(written)
    }
}

/// Human-readable account of a failed run.
pub fn summary(failure: &RunAborted, page: Option<&RenderedPage>) -> String {
    let mut text = format!(
        "pagefeed run aborted\ntime: {}\nstage: {}\ncause: {}\n",
        Utc::now().to_rfc3339(),
        failure.stage,
        failure.cause
    );

    if let PipelineError::NoCandidatesFound { ref tried } = failure.cause {
        text.push_str("selectors tried:\n");
        for selector in tried {
            text.push_str(&format!("  {}\n", selector));
        }
    }

    if let Some(page) = page {
        text.push_str(&format!(
            "page ready: {}\nmarkup bytes: {}\n",
            page.ready,
            page.markup.len()
        ));
    }

    text.push_str(&failure.report.to_string());
    text.push('\n');
    text
}
