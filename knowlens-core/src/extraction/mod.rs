//! # Streaming Extraction
//!
//! Client-side coordination for a long-running, multi-phase knowledge
//! extraction performed by an external service.
//!
//! ## Flow
//!
//! 1. [`StreamingExtractionCoordinator::start`] issues an [`ExtractionRequest`]
//!    carrying a fresh [`ExtractionId`] and opens a session
//! 2. The service emits zero or more progress events and exactly one
//!    terminal event for that ID
//! 3. Each event is checked against the live ID, merged into the running
//!    [`KnowledgeSnapshot`] and surfaced to an [`ExtractionObserver`]
//! 4. `complete` or `error` clears the session and yields an [`ExtractionOutcome`]
//!
//! ## Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use knowlens_core::extraction::{
//!     CoordinatorConfig, ExtractionMessage, ExtractionRequest, ExtractionService,
//!     ProgressEvent, StartAck, StreamingExtractionCoordinator,
//! };
//! use serde_json::json;
//! use tokio::sync::mpsc;
//!
//! struct Loopback(mpsc::Sender<ExtractionMessage>);
//!
//! #[async_trait]
//! impl ExtractionService for Loopback {
//!     async fn start_extraction(&self, request: &ExtractionRequest) -> knowlens_core::Result<StartAck> {
//!         let done = ProgressEvent::new(request.extraction_id.clone(), "complete")
//!             .with_data(json!({ "summary": "hello" }));
//!         self.0.send(done.into()).await.map_err(|e| e.to_string())?;
//!         Ok(StartAck::default())
//!     }
//! }
//!
//! # async fn example() -> knowlens_core::Result<()> {
//! let (tx, mut rx) = mpsc::channel(16);
//! let mut coordinator = StreamingExtractionCoordinator::new(Loopback(tx), CoordinatorConfig::default());
//!
//! coordinator.start("https://example.com", None, json!({})).await?;
//! let outcome = coordinator.run(&mut rx).await?;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod knowledge;
pub mod poller;
pub mod service;
pub mod session;
pub mod types;

pub use config::{CoordinatorConfig, CoordinatorConfigBuilder};
pub use coordinator::{IgnoreReason, MessageDisposition, StreamingExtractionCoordinator};
pub use knowledge::{
    ActionSummary, ContentMetrics, DetectedAction, Entity, KnowledgeSnapshot, Relationship, Topic,
};
pub use poller::{IndexStatus, IndexStatusPoller, IndexStatusSource, PollReport, RetryPolicy};
pub use service::{
    ExtractionFailure, ExtractionObserver, ExtractionOutcome, ExtractionResult, ExtractionService,
    ProgressUpdate, SilentObserver,
};
pub use session::ExtractionSession;
pub use types::{
    CompletionEvent, ErrorDetail, ExtractionId, ExtractionMessage, ExtractionMode,
    ExtractionRequest, Phase, ProgressEvent, StartAck,
};
