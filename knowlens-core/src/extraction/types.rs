//! Message types exchanged with the extraction service

use crate::error::KnowlensError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Correlation token tying progress messages to one extraction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionId(String);

impl ExtractionId {
    /// Generate a fresh, unique ID
    pub fn generate() -> Self {
        Self(format!("extraction_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ExtractionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExtractionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the service should extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Basic,
    Summary,
    Content,
    Actions,
    #[default]
    Full,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Basic => "basic",
            ExtractionMode::Summary => "summary",
            ExtractionMode::Content => "content",
            ExtractionMode::Actions => "actions",
            ExtractionMode::Full => "full",
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = KnowlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(ExtractionMode::Basic),
            "summary" => Ok(ExtractionMode::Summary),
            "content" => Ok(ExtractionMode::Content),
            "actions" => Ok(ExtractionMode::Actions),
            "full" => Ok(ExtractionMode::Full),
            _ => Err(KnowlensError::ConfigError(format!(
                "unknown extraction mode {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage reported on a progress event
///
/// The intermediate set depends on the extraction mode, so unknown names
/// are kept verbatim. Only `Complete` and `Error` carry meaning for the
/// coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    Content,
    Basic,
    Summary,
    Analyzing,
    Extracting,
    Complete,
    Error,
    Other(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Content => "content",
            Phase::Basic => "basic",
            Phase::Summary => "summary",
            Phase::Analyzing => "analyzing",
            Phase::Extracting => "extracting",
            Phase::Complete => "complete",
            Phase::Error => "error",
            Phase::Other(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete | Phase::Error)
    }
}

impl From<String> for Phase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "content" => Phase::Content,
            "basic" => Phase::Basic,
            "summary" => Phase::Summary,
            "analyzing" => Phase::Analyzing,
            "extracting" => Phase::Extracting,
            "complete" => Phase::Complete,
            "error" => Phase::Error,
            _ => Phase::Other(s),
        }
    }
}

impl From<&str> for Phase {
    fn from(s: &str) -> Self {
        Phase::from(s.to_string())
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.as_str().to_string()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start-extraction call issued to the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    /// What to extract from, usually a page URL
    pub target: String,
    pub mode: ExtractionMode,
    /// Mode-specific settings, passed through untouched
    #[serde(default)]
    pub settings: serde_json::Value,
    pub streaming: bool,
    pub extraction_id: ExtractionId,
    /// Ask the service to keep the result in its index
    pub persist_result: bool,
}

/// Service acknowledgement that streaming has begun
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// One error reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            item: None,
        }
    }
}

/// Progress tick for one extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub extraction_id: ExtractionId,
    pub phase: Phase,
    #[serde(default)]
    pub processed_items: u64,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_item: Option<String>,
    /// Partial snapshot; decoded at merge time so a malformed payload can be skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incremental_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
    /// Producer-assigned ordering, when the producer supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl ProgressEvent {
    pub fn new(extraction_id: impl Into<ExtractionId>, phase: impl Into<Phase>) -> Self {
        Self {
            extraction_id: extraction_id.into(),
            phase: phase.into(),
            processed_items: 0,
            total_items: 0,
            current_item: None,
            incremental_data: None,
            errors: Vec::new(),
            sequence: None,
        }
    }

    pub fn with_items(mut self, processed: u64, total: u64) -> Self {
        self.processed_items = processed;
        self.total_items = total;
        self
    }

    pub fn with_current_item(mut self, item: impl Into<String>) -> Self {
        self.current_item = Some(item.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.incremental_data = Some(data);
        self
    }

    pub fn with_error(mut self, error: ErrorDetail) -> Self {
        self.errors.push(error);
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

/// Dedicated terminal event carrying the final snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub extraction_id: ExtractionId,
    pub final_data: crate::extraction::knowledge::KnowledgeSnapshot,
}

/// Any inbound message from the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExtractionMessage {
    Progress(ProgressEvent),
    Complete(CompletionEvent),
}

impl ExtractionMessage {
    pub fn extraction_id(&self) -> &ExtractionId {
        match self {
            ExtractionMessage::Progress(event) => &event.extraction_id,
            ExtractionMessage::Complete(event) => &event.extraction_id,
        }
    }
}

impl From<ProgressEvent> for ExtractionMessage {
    fn from(event: ProgressEvent) -> Self {
        ExtractionMessage::Progress(event)
    }
}

impl From<CompletionEvent> for ExtractionMessage {
    fn from(event: CompletionEvent) -> Self {
        ExtractionMessage::Complete(event)
    }
}
