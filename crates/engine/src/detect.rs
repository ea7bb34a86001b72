use triage_knowledge::Registry;

/// Return the ids of all concepts whose keywords appear in the issue text.
///
/// Title and body are joined with a newline and lowercased; no punctuation
/// stripping, no stemming. A concept fires when any of its keywords is a
/// substring of that text, and fires at most once. Substring (not
/// whole-word) matching is a known precision trade-off: a short keyword can
/// match inside an unrelated longer word. Keyword authors compensate by
/// preferring multi-word phrases.
///
/// The result preserves registry declaration order, independent of where
/// keywords appear in the input. Output order is therefore a function of
/// the registry alone, which keeps generated reports stable across
/// rephrasings of the same issue.
#[must_use]
pub fn detect_concepts(registry: &Registry, title: &str, body: &str) -> Vec<String> {
    let haystack = format!("{title}\n{body}").to_lowercase();

    let detected: Vec<String> = registry
        .iter()
        .filter(|concept| {
            concept
                .keywords
                .iter()
                .any(|keyword| haystack.contains(keyword.as_str()))
        })
        .map(|concept| concept.id.clone())
        .collect();

    if !detected.is_empty() {
        log::debug!("detected concepts: {}", detected.join(", "));
    }
    detected
}
