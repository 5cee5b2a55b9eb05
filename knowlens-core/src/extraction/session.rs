//! Live state for one in-flight extraction

use crate::extraction::knowledge::KnowledgeSnapshot;
use crate::extraction::types::{ExtractionId, ExtractionMode, Phase};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coordinator state for the extraction currently being tracked
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSession {
    pub extraction_id: ExtractionId,
    pub target: String,
    pub mode: ExtractionMode,
    pub started_at: DateTime<Utc>,
    pub phase: Phase,
    pub aggregate: KnowledgeSnapshot,
    pub processed_items: u64,
    pub total_items: u64,
    pub current_item: Option<String>,
    /// Highest producer sequence applied so far
    pub last_sequence: Option<u64>,
    /// Number of progress events applied
    pub events_applied: u64,
}

impl ExtractionSession {
    /// Create an empty session in the mode's initial phase
    pub fn new(extraction_id: ExtractionId, target: impl Into<String>, mode: ExtractionMode) -> Self {
        Self {
            extraction_id,
            target: target.into(),
            mode,
            started_at: Utc::now(),
            phase: initial_phase(mode),
            aggregate: KnowledgeSnapshot::default(),
            processed_items: 0,
            total_items: 0,
            current_item: None,
            last_sequence: None,
            events_applied: 0,
        }
    }

    /// Whether an event carrying `sequence` is newer than anything applied
    ///
    /// Events without a sequence are always accepted.
    pub fn accepts_sequence(&self, sequence: Option<u64>) -> bool {
        match (sequence, self.last_sequence) {
            (Some(incoming), Some(last)) => incoming > last,
            _ => true,
        }
    }

    pub fn record_sequence(&mut self, sequence: Option<u64>) {
        if let Some(seq) = sequence {
            self.last_sequence = Some(self.last_sequence.map_or(seq, |last| last.max(seq)));
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

/// Phase a fresh session reports before the first progress event
fn initial_phase(mode: ExtractionMode) -> Phase {
    match mode {
        ExtractionMode::Basic => Phase::Basic,
        ExtractionMode::Summary => Phase::Summary,
        ExtractionMode::Content | ExtractionMode::Actions | ExtractionMode::Full => Phase::Content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = ExtractionSession::new("x1".into(), "https://example.com", ExtractionMode::Full);

        assert_eq!(session.phase, Phase::Content);
        assert!(session.aggregate.is_empty());
        assert_eq!(session.events_applied, 0);
        assert!(session.elapsed() >= chrono::Duration::zero());
    }

    #[test]
    fn test_initial_phase_follows_mode() {
        let session = ExtractionSession::new("x1".into(), "t", ExtractionMode::Summary);
        assert_eq!(session.phase, Phase::Summary);
    }

    #[test]
    fn test_sequence_guard() {
        let mut session = ExtractionSession::new("x1".into(), "t", ExtractionMode::Full);

        assert!(session.accepts_sequence(Some(3)));
        session.record_sequence(Some(3));

        assert!(!session.accepts_sequence(Some(3)));
        assert!(!session.accepts_sequence(Some(2)));
        assert!(session.accepts_sequence(Some(4)));
        assert!(session.accepts_sequence(None));

        session.record_sequence(None);
        assert_eq!(session.last_sequence, Some(3));
    }
}
