//! The merged knowledge snapshot built up during an extraction
//!
//! The producer re-emits its whole current result set on every tick, so a
//! populated field on an incoming snapshot replaces the aggregate's field
//! outright. Nothing is concatenated.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A named entity found in the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Entity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: None,
            description: None,
            confidence: None,
        }
    }
}

/// A directed relation between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default)]
    pub relation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

/// Something a user can do on the target (a form, a download, a purchase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSummary {
    #[serde(default)]
    pub total_actions: usize,
    #[serde(default)]
    pub action_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetrics {
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub reading_time_minutes: f64,
    #[serde(default)]
    pub link_count: u64,
    #[serde(default)]
    pub image_count: u64,
}

/// Running (or final) extraction result
///
/// Each field is either untouched (`None`) or holds the latest value a
/// progress event supplied for it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<Relationship>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Topic>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_actions: Option<Vec<DetectedAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_summary: Option<ActionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_metrics: Option<ContentMetrics>,
}

impl KnowledgeSnapshot {
    /// Decode a raw `incrementalData` payload
    pub fn from_partial(value: &serde_json::Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Replace every field `incoming` populates; leave the rest alone
    ///
    /// Returns the names of the replaced fields.
    pub fn merge(&mut self, incoming: KnowledgeSnapshot) -> Vec<&'static str> {
        let mut replaced = Vec::new();

        macro_rules! replace {
            ($field:ident) => {
                if let Some(value) = incoming.$field {
                    self.$field = Some(value);
                    replaced.push(stringify!($field));
                }
            };
        }

        replace!(entities);
        replace!(relationships);
        replace!(topics);
        replace!(summary);
        replace!(detected_actions);
        replace!(action_summary);
        replace!(content_metrics);

        replaced
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.as_ref().map_or(0, Vec::len)
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.as_ref().map_or(0, Vec::len)
    }
}
