use std::path::Path;

use chrono::{DateTime, Utc};
use url::Url;

use crate::app::error::Result;
use crate::browser::RenderedPage;
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::dom::HtmlDocument;
use crate::pipeline::{ExtractionOutput, Pipeline, RunAborted, RunOutput};

/// Wires configuration, pipeline and diagnostics together for one process.
pub struct AppContext {
    pub config: Config,
    pub source_url: Url,
    pub pipeline: Pipeline,
    pub diagnostics: Diagnostics,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let source_url = config.source_url()?;
        let pipeline = Pipeline::new(&config.extraction, config.feed.clone());
        let diagnostics = Diagnostics::new(config.diagnostics.clone());

        Ok(Self {
            config,
            source_url,
            pipeline,
            diagnostics,
        })
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::new(Config::load(path)?)
    }

    /// Selectors the renderer waits for before snapshotting.
    pub fn ready_selectors(&self) -> &[String] {
        self.pipeline.cascade().selectors()
    }

    /// Run the pipeline over a rendered snapshot.
    pub fn run_page(&self, page: &RenderedPage, now: DateTime<Utc>) -> std::result::Result<RunOutput, RunAborted> {
        let document = HtmlDocument::parse(&page.markup, page.url.clone());
        self.pipeline.run(&document, now)
    }

    /// Run resolution, extraction and normalization only.
    pub fn extract_page(&self, page: &RenderedPage) -> std::result::Result<ExtractionOutput, RunAborted> {
        let document = HtmlDocument::parse(&page.markup, page.url.clone());
        self.pipeline.extract(&document)
    }
}
