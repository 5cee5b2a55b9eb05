//! Integration tests for the streaming extraction coordinator
//!
//! Covers the correlation barrier, merge semantics, terminal finality,
//! supersession and the channel-driven run loop.

use async_trait::async_trait;
use knowlens_core::extraction::{
    CompletionEvent, CoordinatorConfig, Entity, ErrorDetail, ExtractionFailure, ExtractionId,
    ExtractionMessage, ExtractionObserver, ExtractionOutcome, ExtractionRequest, ExtractionResult,
    ExtractionService, IgnoreReason, KnowledgeSnapshot, MessageDisposition, Phase, ProgressEvent,
    ProgressUpdate, StartAck, StreamingExtractionCoordinator,
};
use knowlens_core::{KnowlensError, Result};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Service that accepts every start call and records it
#[derive(Default)]
struct AcceptingService {
    started: Mutex<Vec<ExtractionId>>,
}

#[async_trait]
impl ExtractionService for AcceptingService {
    async fn start_extraction(&self, request: &ExtractionRequest) -> Result<StartAck> {
        self.started.lock().unwrap().push(request.extraction_id.clone());
        Ok(StartAck::default())
    }
}

/// Service that streams a scripted sequence of events from a background task
struct StreamingService {
    tx: mpsc::Sender<ExtractionMessage>,
    script: fn(&ExtractionId) -> Vec<ExtractionMessage>,
}

#[async_trait]
impl ExtractionService for StreamingService {
    async fn start_extraction(&self, request: &ExtractionRequest) -> Result<StartAck> {
        let messages = (self.script)(&request.extraction_id);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            for message in messages {
                if tx.send(message).await.is_err() {
                    break;
                }
            }
        });
        Ok(StartAck::default())
    }
}

#[derive(Default)]
struct RecordingObserver {
    progress: Mutex<Vec<ProgressUpdate>>,
    updates: Mutex<Vec<KnowledgeSnapshot>>,
    completed: Mutex<Vec<ExtractionResult>>,
    failed: Mutex<Vec<ExtractionFailure>>,
}

impl ExtractionObserver for RecordingObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.progress.lock().unwrap().push(update.clone());
    }

    fn on_update(&self, aggregate: &KnowledgeSnapshot) {
        self.updates.lock().unwrap().push(aggregate.clone());
    }

    fn on_complete(&self, result: &ExtractionResult) {
        self.completed.lock().unwrap().push(result.clone());
    }

    fn on_error(&self, failure: &ExtractionFailure) {
        self.failed.lock().unwrap().push(failure.clone());
    }
}

async fn started(id: &str) -> StreamingExtractionCoordinator<AcceptingService> {
    let mut coordinator =
        StreamingExtractionCoordinator::new(AcceptingService::default(), CoordinatorConfig::default());
    coordinator
        .start_with_id(id.into(), "https://example.com/article", None, json!({}))
        .await
        .unwrap();
    coordinator
}

#[tokio::test]
async fn test_scenario_stale_id_between_progress_and_complete() {
    let mut coordinator = started("x1").await;

    coordinator.handle_progress(
        ProgressEvent::new("x1", "analyzing").with_data(json!({ "entities": [{ "name": "Foo" }] })),
    );
    assert_eq!(coordinator.phase(), Some(&Phase::Analyzing));
    assert_eq!(
        coordinator.aggregate().and_then(|a| a.entities.clone()),
        Some(vec![Entity::named("Foo")])
    );

    let stale = coordinator.handle_progress(
        ProgressEvent::new("x0", "complete").with_data(json!({ "entities": [] })),
    );
    assert_eq!(stale, MessageDisposition::Ignored(IgnoreReason::Superseded));
    assert!(coordinator.is_active());
    assert_eq!(coordinator.phase(), Some(&Phase::Analyzing));

    match coordinator.handle_progress(ProgressEvent::new("x1", "complete")) {
        MessageDisposition::Terminal(ExtractionOutcome::Completed(result)) => {
            assert_eq!(result.extraction_id.as_str(), "x1");
            assert_eq!(result.aggregate.entities, Some(vec![Entity::named("Foo")]));
            assert_eq!(result.events_applied, 2);
        }
        other => panic!("unexpected disposition: {:?}", other),
    }
    assert!(!coordinator.is_active());
}

#[tokio::test]
async fn test_merge_replaces_field_and_keeps_others() {
    let mut coordinator = started("x1").await;

    coordinator.handle_progress(ProgressEvent::new("x1", "extracting").with_data(json!({
        "entities": [{ "name": "e1" }],
        "relationships": [{ "from": "e1", "to": "e9", "type": "mentions" }]
    })));
    coordinator.handle_progress(
        ProgressEvent::new("x1", "extracting").with_data(json!({ "entities": [{ "name": "e2" }] })),
    );

    let aggregate = coordinator.aggregate().cloned().unwrap_or_default();
    assert_eq!(aggregate.entities, Some(vec![Entity::named("e2")]));
    assert_eq!(aggregate.relationship_count(), 1);
}

#[tokio::test]
async fn test_replaying_same_event_is_idempotent() {
    let mut coordinator = started("x1").await;
    let event = ProgressEvent::new("x1", "summary")
        .with_items(1, 4)
        .with_data(json!({ "summary": "About Foo", "topics": [{ "name": "foo" }] }));

    coordinator.handle_progress(event.clone());
    let once = coordinator.aggregate().cloned();
    coordinator.handle_progress(event);
    let twice = coordinator.aggregate().cloned();

    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_events_after_complete_are_ignored() {
    let mut coordinator = started("x1").await;

    coordinator.handle_progress(
        ProgressEvent::new("x1", "analyzing").with_data(json!({ "summary": "done" })),
    );
    let terminal = coordinator.handle_progress(ProgressEvent::new("x1", "complete"));
    assert!(matches!(
        terminal,
        MessageDisposition::Terminal(ExtractionOutcome::Completed(_))
    ));

    let after = coordinator.handle_progress(
        ProgressEvent::new("x1", "extracting").with_data(json!({ "summary": "late" })),
    );
    let completion_after = coordinator.handle_message(
        CompletionEvent {
            extraction_id: "x1".into(),
            final_data: KnowledgeSnapshot::default(),
        }
        .into(),
    );

    assert_eq!(after, MessageDisposition::Ignored(IgnoreReason::NoActiveSession));
    assert_eq!(
        completion_after,
        MessageDisposition::Ignored(IgnoreReason::NoActiveSession)
    );
    assert!(coordinator.aggregate().is_none());
}

#[tokio::test]
async fn test_terminal_finality() {
    let mut coordinator = started("x1").await;

    coordinator.handle_progress(
        ProgressEvent::new("x1", "error").with_error(ErrorDetail::new("rate limited")),
    );
    let after = coordinator.handle_progress(
        ProgressEvent::new("x1", "extracting").with_data(json!({ "summary": "late" })),
    );

    assert_eq!(after, MessageDisposition::Ignored(IgnoreReason::NoActiveSession));
    assert!(coordinator.aggregate().is_none());
}

#[tokio::test]
async fn test_completion_event_replaces_aggregate() {
    let mut coordinator = started("x1").await;

    coordinator.handle_progress(ProgressEvent::new("x1", "analyzing").with_data(json!({
        "entities": [{ "name": "draft" }],
        "summary": "draft summary"
    })));

    let final_data = KnowledgeSnapshot {
        entities: Some(vec![Entity::named("final")]),
        ..Default::default()
    };
    let disposition = coordinator.handle_message(
        CompletionEvent {
            extraction_id: "x1".into(),
            final_data: final_data.clone(),
        }
        .into(),
    );

    match disposition {
        MessageDisposition::Terminal(ExtractionOutcome::Completed(result)) => {
            // Verbatim replacement: the draft summary is gone
            assert_eq!(result.aggregate, final_data);
        }
        other => panic!("unexpected disposition: {:?}", other),
    }
}

#[tokio::test]
async fn test_completion_event_with_stale_id_is_ignored() {
    let mut coordinator = started("x2").await;

    let disposition = coordinator.handle_message(ExtractionMessage::Complete(CompletionEvent {
        extraction_id: "x1".into(),
        final_data: KnowledgeSnapshot::default(),
    }));

    assert_eq!(disposition, MessageDisposition::Ignored(IgnoreReason::Superseded));
    assert!(coordinator.is_active());
}

#[tokio::test]
async fn test_new_start_supersedes_previous_session() {
    let mut coordinator = started("x1").await;
    coordinator.handle_progress(
        ProgressEvent::new("x1", "analyzing").with_data(json!({ "summary": "first" })),
    );

    coordinator
        .start_with_id("x2".into(), "https://example.com/other", None, json!({}))
        .await
        .unwrap();

    let late = coordinator.handle_progress(
        ProgressEvent::new("x1", "extracting").with_data(json!({ "summary": "first, later" })),
    );

    assert_eq!(late, MessageDisposition::Ignored(IgnoreReason::Superseded));
    assert_eq!(coordinator.current_id().map(|id| id.as_str()), Some("x2"));
    assert!(coordinator.aggregate().map_or(false, |a| a.is_empty()));
    assert_eq!(coordinator.service().started.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_observer_sees_progress_updates_and_result() {
    let observer = Arc::new(RecordingObserver::default());
    let mut coordinator =
        StreamingExtractionCoordinator::new(AcceptingService::default(), CoordinatorConfig::default())
            .with_observer(observer.clone());
    coordinator
        .start_with_id("x1".into(), "t", None, json!({}))
        .await
        .unwrap();

    coordinator.handle_progress(ProgressEvent::new("x1", "content").with_items(0, 3));
    coordinator.handle_progress(
        ProgressEvent::new("x1", "analyzing")
            .with_items(1, 3)
            .with_current_item("entities")
            .with_data(json!({ "entities": [{ "name": "Foo" }] })),
    );
    coordinator.handle_progress(ProgressEvent::new("x1", "complete").with_items(3, 3));

    let progress = observer.progress.lock().unwrap();
    assert_eq!(progress.len(), 3);
    assert_eq!(progress[1].current_item.as_deref(), Some("entities"));
    assert_eq!(progress[2].percent(), Some(100.0));

    // Only the merge that changed something triggers a re-render
    assert_eq!(observer.updates.lock().unwrap().len(), 1);
    assert_eq!(observer.completed.lock().unwrap().len(), 1);
    assert!(observer.failed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_streams_to_completion() {
    let (tx, mut rx) = mpsc::channel(16);
    let service = StreamingService {
        tx,
        script: |id| {
            vec![
                ProgressEvent::new(id.clone(), "content").with_items(0, 2).into(),
                ProgressEvent::new("someone-else", "complete").into(),
                ProgressEvent::new(id.clone(), "extracting")
                    .with_items(1, 2)
                    .with_data(json!({ "entities": [{ "name": "Foo" }], "summary": "s" }))
                    .into(),
                ProgressEvent::new(id.clone(), "complete").with_items(2, 2).into(),
            ]
        },
    };
    let mut coordinator = StreamingExtractionCoordinator::new(service, CoordinatorConfig::default());

    let id = coordinator
        .start("https://example.com", None, json!({}))
        .await
        .unwrap();
    let outcome = coordinator.run(&mut rx).await.unwrap();

    match outcome {
        ExtractionOutcome::Completed(result) => {
            assert_eq!(result.extraction_id, id);
            assert_eq!(result.aggregate.entity_count(), 1);
            assert_eq!(result.aggregate.summary.as_deref(), Some("s"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_run_reports_error_phase() {
    let (tx, mut rx) = mpsc::channel(16);
    let service = StreamingService {
        tx,
        script: |id| {
            vec![
                ProgressEvent::new(id.clone(), "analyzing").into(),
                ProgressEvent::new(id.clone(), "error")
                    .with_error(ErrorDetail::new("page could not be parsed"))
                    .into(),
            ]
        },
    };
    let mut coordinator = StreamingExtractionCoordinator::new(service, CoordinatorConfig::default());

    coordinator.start("t", None, json!({})).await.unwrap();
    let outcome = coordinator.run(&mut rx).await.unwrap();

    match outcome {
        ExtractionOutcome::Failed(failure) => {
            assert_eq!(failure.message, "page could not be parsed");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!coordinator.is_active());
}

#[tokio::test]
async fn test_run_reports_closed_channel() {
    let (tx, mut rx) = mpsc::channel::<ExtractionMessage>(16);
    let mut coordinator = started("x1").await;

    tx.send(ProgressEvent::new("x1", "analyzing").into())
        .await
        .unwrap();
    drop(tx);

    let err = coordinator.run(&mut rx).await.unwrap_err();

    assert!(matches!(err, KnowlensError::ChannelClosed { ref extraction_id } if extraction_id == "x1"));
    // The session survives so the caller can decide what to do with it
    assert_eq!(coordinator.phase(), Some(&Phase::Analyzing));
}

#[tokio::test]
async fn test_run_without_session_errors() {
    let (_tx, mut rx) = mpsc::channel::<ExtractionMessage>(1);
    let mut coordinator =
        StreamingExtractionCoordinator::new(AcceptingService::default(), CoordinatorConfig::default());

    let err = coordinator.run(&mut rx).await.unwrap_err();
    assert!(matches!(err, KnowlensError::NoActiveSession));
}

#[tokio::test]
async fn test_sequence_guard_drops_stale_events() {
    let mut coordinator = started("x1").await;

    coordinator.handle_progress(
        ProgressEvent::new("x1", "analyzing")
            .with_sequence(2)
            .with_data(json!({ "summary": "newer" })),
    );
    let stale = coordinator.handle_progress(
        ProgressEvent::new("x1", "content")
            .with_sequence(1)
            .with_data(json!({ "summary": "older" })),
    );

    assert_eq!(stale, MessageDisposition::Ignored(IgnoreReason::OutOfOrder));
    assert_eq!(
        coordinator.aggregate().and_then(|a| a.summary.as_deref()),
        Some("newer")
    );
}

#[tokio::test]
async fn test_arrival_order_when_guard_disabled() {
    let config = CoordinatorConfig::builder().guard_sequence(false).build();
    let mut coordinator = StreamingExtractionCoordinator::new(AcceptingService::default(), config);
    coordinator
        .start_with_id("x1".into(), "t", None, json!({}))
        .await
        .unwrap();

    coordinator.handle_progress(
        ProgressEvent::new("x1", "analyzing")
            .with_sequence(2)
            .with_data(json!({ "summary": "newer" })),
    );
    coordinator.handle_progress(
        ProgressEvent::new("x1", "content")
            .with_sequence(1)
            .with_data(json!({ "summary": "older" })),
    );

    assert_eq!(
        coordinator.aggregate().and_then(|a| a.summary.as_deref()),
        Some("older")
    );
}

#[tokio::test]
async fn test_start_failure_is_surfaced() {
    struct Rejecting;

    #[async_trait]
    impl ExtractionService for Rejecting {
        async fn start_extraction(&self, _request: &ExtractionRequest) -> Result<StartAck> {
            Err(KnowlensError::StartFailed("no tab".to_string()))
        }
    }

    let mut coordinator = StreamingExtractionCoordinator::new(Rejecting, CoordinatorConfig::default());
    let err = coordinator.start("t", None, json!({})).await.unwrap_err();

    assert!(matches!(err, KnowlensError::StartFailed(ref m) if m == "no tab"));
    assert!(coordinator.session().is_none());
}
