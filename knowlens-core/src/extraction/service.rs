//! Boundaries of the coordinator: the external service it starts
//! extractions on, and the observer it reports to

use crate::error::Result;
use crate::extraction::knowledge::KnowledgeSnapshot;
use crate::extraction::types::{ErrorDetail, ExtractionId, ExtractionRequest, Phase, StartAck};
use async_trait::async_trait;
use serde::Serialize;

/// The remote extraction capability
///
/// `start_extraction` only acknowledges that streaming has begun; results
/// arrive later as [`ExtractionMessage`](crate::extraction::ExtractionMessage)s
/// on whatever channel the caller wires up.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn start_extraction(&self, request: &ExtractionRequest) -> Result<StartAck>;
}

/// Progress numbers surfaced on every applied event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub extraction_id: ExtractionId,
    pub phase: Phase,
    pub processed_items: u64,
    pub total_items: u64,
    pub current_item: Option<String>,
}

impl ProgressUpdate {
    /// Completion percentage, if the producer reported a total
    pub fn percent(&self) -> Option<f64> {
        if self.total_items == 0 {
            None
        } else {
            Some((self.processed_items as f64 / self.total_items as f64 * 100.0).min(100.0))
        }
    }
}

/// Successful terminal outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub extraction_id: ExtractionId,
    pub target: String,
    pub aggregate: KnowledgeSnapshot,
    pub elapsed_ms: i64,
    pub events_applied: u64,
}

/// Failed terminal outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionFailure {
    pub extraction_id: ExtractionId,
    /// First reported error's message
    pub message: String,
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExtractionOutcome {
    Completed(ExtractionResult),
    Failed(ExtractionFailure),
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Completed(_))
    }

    pub fn extraction_id(&self) -> &ExtractionId {
        match self {
            ExtractionOutcome::Completed(result) => &result.extraction_id,
            ExtractionOutcome::Failed(failure) => &failure.extraction_id,
        }
    }
}

/// Rendering hook notified as the extraction evolves
pub trait ExtractionObserver: Send + Sync {
    /// Called for every applied progress event
    fn on_progress(&self, _update: &ProgressUpdate) {}
    /// Called whenever a merge changed the aggregate
    fn on_update(&self, _aggregate: &KnowledgeSnapshot) {}
    fn on_complete(&self, _result: &ExtractionResult) {}
    fn on_error(&self, _failure: &ExtractionFailure) {}
}

/// No-op observer for headless/test usage
pub struct SilentObserver;

impl ExtractionObserver for SilentObserver {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        let mut update = ProgressUpdate {
            extraction_id: "x1".into(),
            phase: Phase::Analyzing,
            processed_items: 1,
            total_items: 4,
            current_item: None,
        };
        assert_eq!(update.percent(), Some(25.0));

        update.total_items = 0;
        assert_eq!(update.percent(), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ExtractionOutcome::Failed(ExtractionFailure {
            extraction_id: "x1".into(),
            message: "boom".to_string(),
            errors: vec![ErrorDetail::new("boom")],
        });

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["message"], "boom");
        assert!(!outcome.is_success());
        assert_eq!(outcome.extraction_id().as_str(), "x1");
    }
}
