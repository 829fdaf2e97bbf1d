//! Extraction-and-synthesis pipeline.
//!
//! ```text
//! Document → SelectorCascade → ItemExtractor → Normalizer → FeedSynthesizer
//! ```
//!
//! Failures are two-tier. A bad candidate is logged and skipped inside the
//! extractor. A run with no candidates, or no surviving items, aborts with a
//! [`RunAborted`] carrying the stage reached and the counters so far.

mod config;
mod extractor;
mod normalizer;
mod resolver;
mod state;

pub use config::ExtractionConfig;
pub use extractor::{ExtractionBatch, ItemExtractionError, ItemExtractor, RawItem};
pub use normalizer::{DedupPolicy, Normalizer};
pub use resolver::{Resolution, SelectorCascade};
pub use state::{RunReport, RunStage, RunTracker};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::dom::RenderedDocument;
use crate::domain::{ExtractedItem, FeedDocument, FeedMetadata};
use crate::feed::FeedSynthesizer;

/// Batch-level failures. Each one ends the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no candidate nodes matched any of {} selectors", .tried.len())]
    NoCandidatesFound { tried: Vec<String> },

    #[error("{candidates} candidates matched `{selector}` but no items survived")]
    EmptyResultSet { selector: String, candidates: usize },

    #[error("document unavailable: {0}")]
    DocumentUnavailable(String),
}

/// A failed run: where it stopped, why, and what had been counted.
#[derive(Error, Debug, Clone)]
#[error("run aborted while {stage}: {cause}")]
pub struct RunAborted {
    pub stage: RunStage,
    pub cause: PipelineError,
    pub report: RunReport,
}

impl RunAborted {
    /// The document never became available; nothing was extracted.
    pub fn document_unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        RunTracker::new(url).abort(PipelineError::DocumentUnavailable(reason.into()))
    }
}

/// Normalized items with the counters that produced them.
#[derive(Debug)]
pub struct ExtractionOutput {
    pub items: Vec<ExtractedItem>,
    pub report: RunReport,
}

/// A completed run.
#[derive(Debug)]
pub struct RunOutput {
    pub feed: FeedDocument,
    pub report: RunReport,
}

pub struct Pipeline {
    cascade: SelectorCascade,
    extractor: ItemExtractor,
    normalizer: Normalizer,
    synthesizer: FeedSynthesizer,
}

impl Pipeline {
    pub fn new(config: &ExtractionConfig, metadata: FeedMetadata) -> Self {
        Self {
            cascade: SelectorCascade::new(config.candidate_selectors.iter().cloned()),
            extractor: ItemExtractor::new(config),
            normalizer: Normalizer::new(config),
            synthesizer: FeedSynthesizer::new(metadata),
        }
    }

    pub fn cascade(&self) -> &SelectorCascade {
        &self.cascade
    }

    /// Resolve, extract and normalize. Aborts when nothing usable comes out.
    pub fn extract<D: RenderedDocument>(&self, document: &D) -> Result<ExtractionOutput, RunAborted> {
        let (items, mut tracker) = self.collect(document)?;
        tracker.report.entries = items.len();
        Ok(ExtractionOutput {
            items,
            report: tracker.report,
        })
    }

    /// Full run against a loaded document. Every entry is stamped with `now`.
    pub fn run<D: RenderedDocument>(
        &self,
        document: &D,
        now: DateTime<Utc>,
    ) -> Result<RunOutput, RunAborted> {
        let (items, mut tracker) = self.collect(document)?;

        tracker.advance(RunStage::Synthesizing);
        let feed = match self.synthesizer.synthesize(&items, now) {
            Ok(feed) => feed,
            Err(_) => {
                let cause = empty_result(&tracker.report);
                return Err(tracker.abort(cause));
            }
        };
        tracker.report.entries = feed.len();

        let report = tracker.finish();
        info!(
            "Synthesized feed with {} entries from `{}`",
            report.entries,
            report.matched_selector.as_deref().unwrap_or_default()
        );
        Ok(RunOutput { feed, report })
    }

    fn collect<D: RenderedDocument>(
        &self,
        document: &D,
    ) -> Result<(Vec<ExtractedItem>, RunTracker), RunAborted> {
        let mut tracker = RunTracker::new(document.url().as_str());
        tracker.advance(RunStage::Resolving);

        let Some(resolution) = self.cascade.resolve(document) else {
            let tried = self.cascade.selectors().to_vec();
            return Err(tracker.abort(PipelineError::NoCandidatesFound { tried }));
        };
        info!(
            "Found {} candidates with `{}`",
            resolution.nodes.len(),
            resolution.selector
        );
        tracker.report.matched_selector = Some(resolution.selector);
        tracker.report.candidates_found = resolution.nodes.len();

        tracker.advance(RunStage::Extracting);
        let batch = self.extractor.extract_all(&resolution.nodes);
        tracker.report.candidates_processed = batch.processed;
        tracker.report.items_extracted = batch.items.len();
        tracker.report.items_failed = batch.failures.len();

        tracker.advance(RunStage::Normalizing);
        let items = self.normalizer.normalize(batch.items);
        tracker.report.items_normalized = items.len();
        info!(
            "Extracted {} items ({} skipped)",
            items.len(),
            batch.processed - items.len()
        );

        if items.is_empty() {
            let cause = empty_result(&tracker.report);
            return Err(tracker.abort(cause));
        }

        Ok((items, tracker))
    }
}

fn empty_result(report: &RunReport) -> PipelineError {
    PipelineError::EmptyResultSet {
        selector: report.matched_selector.clone().unwrap_or_default(),
        candidates: report.candidates_found,
    }
}
