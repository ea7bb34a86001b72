use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use triage_protocol::FileReference;

use crate::error::{Result, SchemaError};

/// Curated registry shipped with the binary. Override with an explicit file
/// path when iterating on keyword sets.
const BUILTIN: &str = include_str!("../../../knowledge/concepts.toml");

/// One named topic in the knowledge base.
///
/// `keywords` are lowercase trigger phrases matched as substrings of the
/// issue text. `suggested_labels` live on the concept so the
/// concept-to-label policy is data, not conditionals: several sub-topics in
/// one concept can share a single label.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConceptDefinition {
    pub id: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub file_references: Vec<FileReference>,
    #[serde(default)]
    pub documentation_links: Vec<String>,
    #[serde(default)]
    pub suggested_labels: Vec<String>,
    /// Informational cross-links, carried through for downstream consumers.
    /// Not used for matching or dedup, but a dangling id is still a
    /// load-time error.
    #[serde(default)]
    pub related_concepts: Vec<String>,
}

#[derive(Deserialize)]
struct RawRegistry {
    #[serde(default)]
    concepts: Vec<ConceptDefinition>,
}

/// Immutable, validated concept table. Constructed once per process and
/// passed by reference through the pure pipeline; declaration order is the
/// output order of every detection run.
#[derive(Debug, Clone)]
pub struct Registry {
    concepts: Vec<ConceptDefinition>,
    by_id: HashMap<String, usize>,
}

impl Registry {
    /// Load the embedded registry. A failure here means the shipped data
    /// file is broken and the build should never have been released.
    pub fn builtin() -> Result<Self> {
        Self::from_slice(BUILTIN.as_bytes())
    }

    /// Load a registry override from a JSON or TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_slice(&bytes)?;
        log::debug!(
            "loaded registry from {} ({} concepts)",
            path.display(),
            registry.len()
        );
        Ok(registry)
    }

    /// Parse raw bytes, trying JSON first and falling back to TOML, the
    /// same acceptance rule the rest of our config surface uses.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: RawRegistry = match serde_json::from_slice(bytes) {
            Ok(raw) => raw,
            Err(json_err) => {
                let utf8 = std::str::from_utf8(bytes).map_err(|err| SchemaError::Parse {
                    json: json_err.to_string(),
                    toml: err.to_string(),
                })?;
                toml::from_str(utf8).map_err(|toml_err| SchemaError::Parse {
                    json: json_err.to_string(),
                    toml: toml_err.to_string(),
                })?
            }
        };
        Self::from_concepts(raw.concepts)
    }

    /// Validate and index a concept list. All-or-nothing: the first schema
    /// violation aborts the load.
    pub fn from_concepts(concepts: Vec<ConceptDefinition>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(concepts.len());
        for (index, concept) in concepts.iter().enumerate() {
            if concept.id.is_empty() {
                return Err(SchemaError::EmptyId { index });
            }
            if by_id.insert(concept.id.clone(), index).is_some() {
                return Err(SchemaError::DuplicateId {
                    id: concept.id.clone(),
                });
            }
            if concept.keywords.is_empty() {
                return Err(SchemaError::EmptyKeywords {
                    id: concept.id.clone(),
                });
            }
            for keyword in &concept.keywords {
                if keyword.is_empty() {
                    return Err(SchemaError::EmptyKeyword {
                        id: concept.id.clone(),
                    });
                }
                if *keyword != keyword.to_lowercase() {
                    return Err(SchemaError::KeywordNotLowercase {
                        id: concept.id.clone(),
                        keyword: keyword.clone(),
                    });
                }
            }
        }

        // Second pass: related ids may point forward, so the full id set
        // must exist before checking them.
        for concept in &concepts {
            for reference in &concept.related_concepts {
                if !by_id.contains_key(reference) {
                    return Err(SchemaError::DanglingRelated {
                        id: concept.id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }

        Ok(Self { concepts, by_id })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConceptDefinition> {
        self.concepts.iter()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConceptDefinition> {
        self.by_id.get(id).map(|&index| &self.concepts[index])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}
