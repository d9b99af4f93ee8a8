//! Error types for the discography engine.
//!
//! Only structural problems with the input collections (and invalid
//! classifier configuration) are surfaced as errors. Missing optional
//! fields, unparseable dates and dangling release-group references resolve
//! to defaults or sentinels and never reach this enum.

/// Top-level error enum for loading and configuring the engine.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{collection} collection is not a JSON array")]
    NotAList { collection: &'static str },

    #[error("{collection} record {index} is not a JSON object")]
    NotAnObject {
        collection: &'static str,
        index: usize,
    },

    #[error("{collection} record {index} is malformed: {source}")]
    InvalidRecord {
        collection: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid classifier config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// True for errors caused by a malformed album or song collection.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CatalogError::NotAList { .. }
                | CatalogError::NotAnObject { .. }
                | CatalogError::InvalidRecord { .. }
                | CatalogError::Json(_)
        )
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
