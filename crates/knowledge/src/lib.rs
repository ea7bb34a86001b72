//! The hand-maintained knowledge base: concept definitions, the immutable
//! registry, and fail-fast schema validation.
//!
//! Loading is all-or-nothing. A silently dropped concept would produce
//! incomplete detection results with no visible signal, so any schema
//! violation refuses the whole registry.

mod error;
mod registry;

pub use error::{Result, SchemaError};
pub use registry::{ConceptDefinition, Registry};
