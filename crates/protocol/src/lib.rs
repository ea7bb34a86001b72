//! Wire types for the issue-triage Command API.
//!
//! Everything the engine emits to the calling automation goes through these
//! types. Field names are camelCase on the wire because that is the payload
//! shape the labeling workflow consumes.

use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A file the knowledge base associates with a concept.
///
/// `path` is the canonical identity: two references with the same `path`
/// coming from different concepts are the same output entry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub path: String,
    pub description: String,
    #[serde(default)]
    pub related_paths: Vec<String>,
    #[serde(default)]
    pub doc_links: Vec<String>,
}

/// The aggregated, deduplicated result of one detection run.
///
/// Constructed once per (title, body) pair and never mutated afterwards.
/// `comment` is a pure function of the other four fields: the empty string
/// when nothing was detected, a rendered Markdown report otherwise.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueContext {
    pub detected_concepts: Vec<String>,
    pub relevant_files: Vec<FileReference>,
    pub documentation_links: Vec<String>,
    pub suggested_labels: Vec<String>,
    pub comment: String,
}

impl IssueContext {
    /// True when no concept fired (all collections empty by construction).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detected_concepts.is_empty()
    }
}

/// Machine-readable failure attached to a degraded [`AnalyzeOutput`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// The single JSON document the adapter writes to stdout.
///
/// On the happy path this is just the context. When the pipeline faults the
/// adapter degrades to an empty context plus an [`ErrorEnvelope`], so the
/// caller can fall back to its secondary labeling path without parsing
/// failures.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput {
    #[serde(flatten)]
    pub context: IssueContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

impl AnalyzeOutput {
    #[must_use]
    pub fn from_context(context: IssueContext) -> Self {
        Self {
            context,
            error: None,
        }
    }

    /// Empty context carrying the failure; the adapter's fail-soft payload.
    #[must_use]
    pub fn degraded(error: ErrorEnvelope) -> Self {
        Self {
            context: IssueContext::default(),
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
