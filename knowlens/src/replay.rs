//! Replay a recorded extraction stream through the coordinator
//!
//! A script is JSON Lines: one [`ExtractionMessage`] per line, blank lines
//! and `#` comments ignored. Messages whose `extractionId` is
//! [`LIVE_ID_PLACEHOLDER`] are rewritten to the ID of the extraction being
//! replayed; every other ID is sent verbatim, which is how a script stages
//! stale output from a superseded run.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use knowlens_core::extraction::{
    CoordinatorConfig, ExtractionFailure, ExtractionId, ExtractionMessage, ExtractionMode,
    ExtractionObserver, ExtractionOutcome, ExtractionRequest, ExtractionResult, ExtractionService,
    ProgressUpdate, StartAck, StreamingExtractionCoordinator,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Stands in for "whatever ID the replayed extraction was started with"
pub const LIVE_ID_PLACEHOLDER: &str = "$live";

/// Parse a script from its text
pub fn parse_script(text: &str) -> Result<Vec<ExtractionMessage>> {
    let mut messages = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let message: ExtractionMessage = serde_json::from_str(line)
            .with_context(|| format!("Invalid message on line {}", index + 1))?;
        messages.push(message);
    }

    Ok(messages)
}

/// Read and parse a script file
pub fn load_script(path: &Path) -> Result<Vec<ExtractionMessage>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {:?}", path))?;
    let messages = parse_script(&text)?;
    debug!("Loaded {} message(s) from {:?}", messages.len(), path);
    Ok(messages)
}

/// Extraction service that answers a start call by streaming a script
///
/// The script is sent once, from a background task, and the sender is
/// dropped afterwards so the receiving side sees the channel close.
pub struct ScriptedService {
    script: Vec<ExtractionMessage>,
    sender: Mutex<Option<mpsc::Sender<ExtractionMessage>>>,
    requests: Mutex<Vec<ExtractionRequest>>,
}

impl ScriptedService {
    pub fn new(script: Vec<ExtractionMessage>, sender: mpsc::Sender<ExtractionMessage>) -> Self {
        Self {
            script,
            sender: Mutex::new(Some(sender)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

fn bind_live_id(message: ExtractionMessage, live: &ExtractionId) -> ExtractionMessage {
    if message.extraction_id().as_str() != LIVE_ID_PLACEHOLDER {
        return message;
    }
    match message {
        ExtractionMessage::Progress(mut event) => {
            event.extraction_id = live.clone();
            event.into()
        }
        ExtractionMessage::Complete(mut event) => {
            event.extraction_id = live.clone();
            event.into()
        }
    }
}

#[async_trait]
impl ExtractionService for ScriptedService {
    async fn start_extraction(&self, request: &ExtractionRequest) -> knowlens_core::Result<StartAck> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let sender = self
            .sender
            .lock()
            .ok()
            .and_then(|mut sender| sender.take())
            .ok_or_else(|| {
                knowlens_core::KnowlensError::StartFailed("script already replayed".to_string())
            })?;

        let live = request.extraction_id.clone();
        let messages: Vec<ExtractionMessage> = self
            .script
            .iter()
            .cloned()
            .map(|message| bind_live_id(message, &live))
            .collect();

        info!("Replaying {} message(s) for {}", messages.len(), live);
        tokio::spawn(async move {
            for message in messages {
                if sender.send(message).await.is_err() {
                    debug!("Replay receiver dropped; stopping");
                    break;
                }
            }
        });

        Ok(StartAck {
            message: Some(format!("replaying for {}", request.target)),
        })
    }
}

/// Prints progress lines to stderr
pub struct ConsoleObserver;

impl ExtractionObserver for ConsoleObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        let percent = update
            .percent()
            .map(|p| format!(" {:.0}%", p))
            .unwrap_or_default();
        let item = update
            .current_item
            .as_deref()
            .map(|item| format!(" ({})", item))
            .unwrap_or_default();
        eprintln!(
            "[{}] {}{} {}/{}{}",
            update.extraction_id,
            update.phase,
            percent,
            update.processed_items,
            update.total_items,
            item
        );
    }

    fn on_complete(&self, result: &ExtractionResult) {
        eprintln!(
            "[{}] complete: {} entities, {} relationships",
            result.extraction_id,
            result.aggregate.entity_count(),
            result.aggregate.relationship_count()
        );
    }

    fn on_error(&self, failure: &ExtractionFailure) {
        eprintln!("[{}] error: {}", failure.extraction_id, failure.message);
    }
}

/// How to start the replayed extraction
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub target: String,
    pub extraction_id: Option<ExtractionId>,
    pub mode: Option<ExtractionMode>,
    pub settings: serde_json::Value,
    pub timeout: Option<Duration>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            target: "about:replay".to_string(),
            extraction_id: None,
            mode: None,
            settings: serde_json::json!({}),
            timeout: None,
        }
    }
}

/// Start an extraction against `script` and drive it to its terminal event
pub async fn replay(
    script: Vec<ExtractionMessage>,
    options: ReplayOptions,
    config: CoordinatorConfig,
    observer: Arc<dyn ExtractionObserver>,
) -> Result<ExtractionOutcome> {
    config.validate()?;

    let (tx, mut rx) = mpsc::channel(config.channel_capacity);
    let service = ScriptedService::new(script, tx);
    let mut coordinator = StreamingExtractionCoordinator::new(service, config).with_observer(observer);

    let extraction_id = match options.extraction_id {
        Some(id) => {
            coordinator
                .start_with_id(id, &options.target, options.mode, options.settings)
                .await?
        }
        None => {
            coordinator
                .start(&options.target, options.mode, options.settings)
                .await?
        }
    };

    let outcome = match options.timeout {
        Some(limit) => tokio::time::timeout(limit, coordinator.run(&mut rx))
            .await
            .map_err(|_| anyhow!("Extraction {} timed out after {:?}", extraction_id, limit))??,
        None => coordinator.run(&mut rx).await?,
    };

    Ok(outcome)
}
