use std::collections::HashSet;

use triage_knowledge::Registry;
use triage_protocol::IssueContext;

use crate::render::render_comment;

/// Merge the metadata of all detected concepts into one deduplicated
/// [`IssueContext`].
///
/// Concepts are walked in the order `detect_concepts` returned them
/// (registry declaration order). Files dedup by `path` with first
/// occurrence winning; doc links and labels dedup by string equality,
/// first-appearance order preserved. An empty detection list is a normal
/// outcome and yields an all-empty context with an empty comment.
///
/// The returned context is complete: `comment` is rendered here, before
/// the value is handed out, and is never mutated afterwards.
#[must_use]
pub fn build_context(registry: &Registry, detected: &[String]) -> IssueContext {
    let mut context = IssueContext {
        detected_concepts: detected.to_vec(),
        ..IssueContext::default()
    };

    let mut seen_paths: HashSet<&str> = HashSet::new();
    let mut seen_docs: HashSet<&str> = HashSet::new();
    let mut seen_labels: HashSet<&str> = HashSet::new();

    for id in detected {
        let Some(concept) = registry.get(id) else {
            // detect_concepts only emits registry ids; an unknown id here
            // means the caller mixed registries.
            log::warn!("skipping unknown concept id '{id}'");
            continue;
        };

        for file in &concept.file_references {
            if seen_paths.insert(&file.path) {
                context.relevant_files.push(file.clone());
            }
        }
        for link in &concept.documentation_links {
            if seen_docs.insert(link) {
                context.documentation_links.push(link.clone());
            }
        }
        for label in &concept.suggested_labels {
            if seen_labels.insert(label) {
                context.suggested_labels.push(label.clone());
            }
        }
    }

    context.comment = render_comment(&context);
    context
}
