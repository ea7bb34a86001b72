use triage_protocol::IssueContext;

/// Stable marker callers use for idempotent posting: before posting the
/// rendered comment, look for this marker in existing comments. The engine
/// is stateless across invocations and cannot know posting history itself.
pub const COMMENT_MARKER: &str = "<!-- knowledge-base-context -->";

/// Render the Markdown report for a context.
///
/// Returns the empty string when nothing was detected; callers must treat
/// that as "post nothing", not as an error. For equal contexts the output
/// is byte-identical. Consumers key on the section headings and the marker,
/// so those must stay stable across versions.
#[must_use]
pub fn render_comment(context: &IssueContext) -> String {
    if context.detected_concepts.is_empty() {
        return String::new();
    }

    let mut md = String::new();
    md.push_str(COMMENT_MARKER);
    md.push_str("\n## Knowledge base context\n\n");

    md.push_str("### Detected concepts\n\n");
    for id in &context.detected_concepts {
        md.push_str(&format!("- {id}\n"));
    }
    md.push('\n');

    if !context.relevant_files.is_empty() {
        md.push_str("### Relevant files\n\n");
        for file in &context.relevant_files {
            md.push_str(&format!("- `{}`: {}\n", file.path, file.description));
            for related in &file.related_paths {
                md.push_str(&format!("  - related: `{related}`\n"));
            }
            for link in &file.doc_links {
                md.push_str(&format!("  - docs: {link}\n"));
            }
        }
        md.push('\n');
    }

    if !context.documentation_links.is_empty() {
        md.push_str("### Documentation\n\n");
        for link in &context.documentation_links {
            md.push_str(&format!("- {link}\n"));
        }
        md.push('\n');
    }

    md
}
