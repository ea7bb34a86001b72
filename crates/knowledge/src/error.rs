use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Registry defects are maintenance bugs, not runtime conditions: loading
/// fails as a whole and each variant names the offending entry and the rule
/// it violated. There is no skip-on-error path.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("concept at index {index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate concept id '{id}'")]
    DuplicateId { id: String },

    #[error("concept '{id}' has no keywords and can never fire")]
    EmptyKeywords { id: String },

    #[error("concept '{id}' has an empty keyword")]
    EmptyKeyword { id: String },

    #[error("concept '{id}' keyword '{keyword}' must be lowercase")]
    KeywordNotLowercase { id: String, keyword: String },

    #[error("concept '{id}' references unknown related concept '{reference}'")]
    DanglingRelated { id: String, reference: String },

    #[error("failed to read registry file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("registry is not valid JSON ({json}) or TOML ({toml})")]
    Parse { json: String, toml: String },
}
