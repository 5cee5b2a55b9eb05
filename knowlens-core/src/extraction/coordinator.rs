//! Streaming extraction coordinator
//!
//! Tracks at most one live extraction. Every inbound message is checked
//! against the live session's correlation ID first; anything else is
//! dropped, which is how a superseded extraction's late output is kept from
//! touching the current view. Starting a new extraction is the only
//! cancellation primitive: the old remote computation keeps running, its
//! output is simply orphaned.

use crate::error::{KnowlensError, Result};
use crate::extraction::config::CoordinatorConfig;
use crate::extraction::knowledge::KnowledgeSnapshot;
use crate::extraction::service::{
    ExtractionFailure, ExtractionObserver, ExtractionOutcome, ExtractionResult, ExtractionService,
    ProgressUpdate, SilentObserver,
};
use crate::extraction::session::ExtractionSession;
use crate::extraction::types::{
    CompletionEvent, ExtractionId, ExtractionMessage, ExtractionMode, ExtractionRequest, Phase,
    ProgressEvent,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Why a message was dropped without effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No extraction is live (never started, or already terminated)
    NoActiveSession,
    /// Carries an ID other than the live session's
    Superseded,
    /// Producer sequence not newer than the last applied one
    OutOfOrder,
}

/// What handling one message did
#[derive(Debug, Clone, PartialEq)]
pub enum MessageDisposition {
    Ignored(IgnoreReason),
    /// Non-terminal progress applied to the live session
    Applied(ProgressUpdate),
    /// The live session finished; it has been cleared
    Terminal(ExtractionOutcome),
}

/// Drives one client's extraction lifecycle against an [`ExtractionService`]
pub struct StreamingExtractionCoordinator<S> {
    service: S,
    config: CoordinatorConfig,
    observer: Arc<dyn ExtractionObserver>,
    session: Option<ExtractionSession>,
}

impl<S: ExtractionService> StreamingExtractionCoordinator<S> {
    pub fn new(service: S, config: CoordinatorConfig) -> Self {
        Self {
            service,
            config,
            observer: Arc::new(SilentObserver),
            session: None,
        }
    }

    /// Attach the observer that renders progress and results
    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Start an extraction with a freshly generated correlation ID
    pub async fn start(
        &mut self,
        target: &str,
        mode: Option<ExtractionMode>,
        settings: serde_json::Value,
    ) -> Result<ExtractionId> {
        self.start_with_id(ExtractionId::generate(), target, mode, settings)
            .await
    }

    /// Start an extraction under a caller-chosen correlation ID
    ///
    /// Any previously live session is dropped before the request is issued,
    /// so its later messages become inert whether or not this start
    /// succeeds. On failure no new session exists.
    pub async fn start_with_id(
        &mut self,
        extraction_id: ExtractionId,
        target: &str,
        mode: Option<ExtractionMode>,
        settings: serde_json::Value,
    ) -> Result<ExtractionId> {
        if let Some(previous) = self.session.take() {
            info!(
                "Superseding extraction {} (phase: {})",
                previous.extraction_id, previous.phase
            );
        }

        let mode = mode.unwrap_or(self.config.default_mode);
        let request = ExtractionRequest {
            target: target.to_string(),
            mode,
            settings,
            streaming: true,
            extraction_id: extraction_id.clone(),
            persist_result: self.config.persist_results,
        };

        if let Err(e) = self.service.start_extraction(&request).await {
            warn!("Extraction {} failed to start: {}", extraction_id, e);
            return Err(match e {
                KnowlensError::StartFailed(_) => e,
                other => KnowlensError::StartFailed(other.to_string()),
            });
        }

        info!("Started extraction {} ({}) for {}", extraction_id, mode, target);
        self.session = Some(ExtractionSession::new(extraction_id.clone(), target, mode));
        Ok(extraction_id)
    }

    /// Apply one inbound message
    pub fn handle_message(&mut self, message: ExtractionMessage) -> MessageDisposition {
        match message {
            ExtractionMessage::Progress(event) => self.handle_progress(event),
            ExtractionMessage::Complete(event) => self.handle_completion(event),
        }
    }

    /// Apply a progress event to the live session
    pub fn handle_progress(&mut self, event: ProgressEvent) -> MessageDisposition {
        if let Err(reason) = self.check_correlation(&event.extraction_id) {
            return MessageDisposition::Ignored(reason);
        }

        let guard = self.config.guard_sequence;
        let Some(session) = self.session.as_mut() else {
            return MessageDisposition::Ignored(IgnoreReason::NoActiveSession);
        };

        if guard && !session.accepts_sequence(event.sequence) {
            debug!(
                "Dropping out-of-order event for {} (sequence {:?} <= {:?})",
                event.extraction_id, event.sequence, session.last_sequence
            );
            return MessageDisposition::Ignored(IgnoreReason::OutOfOrder);
        }

        session.record_sequence(event.sequence);
        session.phase = event.phase.clone();
        session.processed_items = event.processed_items;
        session.total_items = event.total_items;
        session.current_item = event.current_item.clone();
        session.events_applied += 1;

        let mut changed = false;
        if let Some(data) = &event.incremental_data {
            match KnowledgeSnapshot::from_partial(data) {
                Ok(partial) => {
                    let replaced = session.aggregate.merge(partial);
                    if !replaced.is_empty() {
                        debug!(
                            "Merged {:?} into extraction {} ({})",
                            replaced, session.extraction_id, session.phase
                        );
                        changed = true;
                    }
                }
                Err(e) => {
                    warn!(
                        "Skipping malformed incremental data for {}: {}",
                        session.extraction_id, e
                    );
                }
            }
        }

        let update = ProgressUpdate {
            extraction_id: session.extraction_id.clone(),
            phase: session.phase.clone(),
            processed_items: session.processed_items,
            total_items: session.total_items,
            current_item: session.current_item.clone(),
        };

        self.observer.on_progress(&update);
        if changed {
            self.observer.on_update(&session.aggregate);
        }

        if event.phase == Phase::Complete {
            return self.finish();
        }
        if event.phase == Phase::Error {
            return self.fail(event);
        }
        MessageDisposition::Applied(update)
    }

    /// Apply a dedicated completion event: its payload replaces the aggregate wholesale
    pub fn handle_completion(&mut self, event: CompletionEvent) -> MessageDisposition {
        if let Err(reason) = self.check_correlation(&event.extraction_id) {
            return MessageDisposition::Ignored(reason);
        }

        if let Some(session) = self.session.as_mut() {
            session.aggregate = event.final_data;
            session.phase = Phase::Complete;
            self.observer.on_update(&session.aggregate);
        }

        self.finish()
    }

    /// Drain `messages` until the live session terminates
    ///
    /// No timeout is applied here; wrap the call in `tokio::time::timeout`
    /// if one is needed.
    pub async fn run(
        &mut self,
        messages: &mut mpsc::Receiver<ExtractionMessage>,
    ) -> Result<ExtractionOutcome> {
        let extraction_id = self
            .current_id()
            .cloned()
            .ok_or(KnowlensError::NoActiveSession)?;

        while let Some(message) = messages.recv().await {
            if let MessageDisposition::Terminal(outcome) = self.handle_message(message) {
                return Ok(outcome);
            }
        }

        warn!("Message channel closed while extraction {} was live", extraction_id);
        Err(KnowlensError::ChannelClosed {
            extraction_id: extraction_id.to_string(),
        })
    }

    pub fn session(&self) -> Option<&ExtractionSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_id(&self) -> Option<&ExtractionId> {
        self.session.as_ref().map(|s| &s.extraction_id)
    }

    pub fn phase(&self) -> Option<&Phase> {
        self.session.as_ref().map(|s| &s.phase)
    }

    pub fn aggregate(&self) -> Option<&KnowledgeSnapshot> {
        self.session.as_ref().map(|s| &s.aggregate)
    }

    /// Correlation barrier
    fn check_correlation(&self, extraction_id: &ExtractionId) -> std::result::Result<(), IgnoreReason> {
        match &self.session {
            None => {
                debug!("No live extraction; dropping message for {}", extraction_id);
                Err(IgnoreReason::NoActiveSession)
            }
            Some(session) if &session.extraction_id != extraction_id => {
                debug!(
                    "Dropping message for superseded extraction {} (live: {})",
                    extraction_id, session.extraction_id
                );
                Err(IgnoreReason::Superseded)
            }
            Some(_) => Ok(()),
        }
    }

    fn finish(&mut self) -> MessageDisposition {
        let Some(session) = self.session.take() else {
            return MessageDisposition::Ignored(IgnoreReason::NoActiveSession);
        };

        let result = ExtractionResult {
            elapsed_ms: session.elapsed().num_milliseconds(),
            extraction_id: session.extraction_id,
            target: session.target,
            aggregate: session.aggregate,
            events_applied: session.events_applied,
        };

        info!(
            "Extraction {} complete: {} entities, {} relationships in {}ms",
            result.extraction_id,
            result.aggregate.entity_count(),
            result.aggregate.relationship_count(),
            result.elapsed_ms
        );
        self.observer.on_complete(&result);
        MessageDisposition::Terminal(ExtractionOutcome::Completed(result))
    }

    fn fail(&mut self, event: ProgressEvent) -> MessageDisposition {
        self.session = None;

        let message = event
            .errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "Extraction failed".to_string());
        let failure = ExtractionFailure {
            extraction_id: event.extraction_id,
            message,
            errors: event.errors,
        };

        info!("Extraction {} failed: {}", failure.extraction_id, failure.message);
        self.observer.on_error(&failure);
        MessageDisposition::Terminal(ExtractionOutcome::Failed(failure))
    }
}
