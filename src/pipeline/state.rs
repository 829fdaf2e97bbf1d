use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::pipeline::{PipelineError, RunAborted};

/// Stages of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStage {
    Loading,
    Resolving,
    Extracting,
    Normalizing,
    Synthesizing,
    Done,
    Aborted,
}

impl RunStage {
    /// Runs move strictly forward; `Aborted` is reachable from any live stage.
    pub fn can_advance_to(self, next: RunStage) -> bool {
        use RunStage::*;
        matches!(
            (self, next),
            (Loading, Resolving)
                | (Resolving, Extracting)
                | (Extracting, Normalizing)
                | (Normalizing, Synthesizing)
                | (Synthesizing, Done)
        ) || (next == Aborted && !self.is_terminal())
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunStage::Done | RunStage::Aborted)
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Loading => "loading",
            RunStage::Resolving => "resolving",
            RunStage::Extracting => "extracting",
            RunStage::Normalizing => "normalizing",
            RunStage::Synthesizing => "synthesizing",
            RunStage::Done => "done",
            RunStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Counters collected along the run, for logs and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub url: String,
    pub matched_selector: Option<String>,
    pub candidates_found: usize,
    pub candidates_processed: usize,
    pub items_extracted: usize,
    pub items_failed: usize,
    pub items_normalized: usize,
    pub entries: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "url: {}", self.url)?;
        writeln!(
            f,
            "matched selector: {}",
            self.matched_selector.as_deref().unwrap_or("(none)")
        )?;
        writeln!(f, "candidates found: {}", self.candidates_found)?;
        writeln!(f, "candidates processed: {}", self.candidates_processed)?;
        writeln!(f, "items extracted: {}", self.items_extracted)?;
        writeln!(f, "items failed: {}", self.items_failed)?;
        writeln!(f, "items normalized: {}", self.items_normalized)?;
        write!(f, "entries: {}", self.entries)
    }
}

/// Tracks the current stage and report of an in-flight run.
#[derive(Debug)]
pub struct RunTracker {
    stage: RunStage,
    pub report: RunReport,
}

impl RunTracker {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            stage: RunStage::Loading,
            report: RunReport {
                url: url.into(),
                ..Default::default()
            },
        }
    }

    pub fn advance(&mut self, next: RunStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal transition {} -> {}",
            self.stage,
            next
        );
        debug!(from = %self.stage, to = %next, "run stage");
        self.stage = next;
    }

    /// Abort from the current stage.
    pub fn abort(self, cause: PipelineError) -> RunAborted {
        debug!(from = %self.stage, cause = %cause, "run aborted");
        RunAborted {
            stage: self.stage,
            cause,
            report: self.report,
        }
    }

    pub fn finish(mut self) -> RunReport {
        self.advance(RunStage::Done);
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        use RunStage::*;
        assert!(Loading.can_advance_to(Resolving));
        assert!(Resolving.can_advance_to(Extracting));
        assert!(Extracting.can_advance_to(Normalizing));
        assert!(Normalizing.can_advance_to(Synthesizing));
        assert!(Synthesizing.can_advance_to(Done));

        assert!(!Loading.can_advance_to(Extracting));
        assert!(!Normalizing.can_advance_to(Resolving));
        assert!(!Done.can_advance_to(Loading));
    }

    #[test]
    fn test_abort_reachable_from_live_stages_only() {
        use RunStage::*;
        for stage in [Loading, Resolving, Extracting, Normalizing, Synthesizing] {
            assert!(stage.can_advance_to(Aborted), "{stage}");
        }
        assert!(!Done.can_advance_to(Aborted));
        assert!(!Aborted.can_advance_to(Aborted));
    }

    #[test]
    fn test_abort_keeps_stage_and_report() {
        let mut tracker = RunTracker::new("https://x/");
        tracker.advance(RunStage::Resolving);
        tracker.report.candidates_found = 0;
        let aborted = tracker.abort(PipelineError::NoCandidatesFound {
            tried: vec!["div.article".into()],
        });
        assert_eq!(aborted.stage, RunStage::Resolving);
        assert_eq!(aborted.report.url, "https://x/");
    }

    #[test]
    fn test_report_display() {
        let report = RunReport {
            url: "https://x/".into(),
            matched_selector: Some("div.article".into()),
            candidates_found: 3,
            ..Default::default()
        };
        let text = report.to_string();
        assert!(text.contains("matched selector: div.article"));
        assert!(text.contains("candidates found: 3"));
    }
}
