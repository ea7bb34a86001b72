//! The pure detection pipeline: keyword matching, context aggregation, and
//! comment rendering. No I/O, no shared state; every function takes the
//! registry by reference and is deterministic for a given registry and
//! input pair.

mod context;
mod detect;
mod render;

pub use context::build_context;
pub use detect::detect_concepts;
pub use render::{render_comment, COMMENT_MARKER};

use triage_knowledge::Registry;
use triage_protocol::IssueContext;

/// Run the full pipeline for one issue: detect, aggregate, render.
#[must_use]
pub fn analyze(registry: &Registry, title: &str, body: &str) -> IssueContext {
    let detected = detect_concepts(registry, title, body);
    build_context(registry, &detected)
}
