//! Error types for metadata extraction

use thiserror::Error;

/// Errors raised while building or evaluating rule tables
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A rule's selector pattern could not be parsed
    #[error("invalid selector '{selector}' for field '{field}': {reason}")]
    InvalidSelector {
        field: String,
        selector: String,
        reason: String,
    },

    /// A processor received a value of the wrong shape
    #[error("processor {index} of field '{field}' expects {expected}, got {found}")]
    ProcessorShape {
        field: String,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// A field was added twice to a rule table
    #[error("field '{0}' is already defined")]
    DuplicateField(String),

    #[error("unknown accessor '{0}' (expected 'text', 'html', 'inner_html' or 'attr:<name>')")]
    UnknownAccessor(String),

    #[error("unknown processor '{0}'")]
    UnknownProcessor(String),

    #[error("unknown scorer '{0}'")]
    UnknownScorer(String),

    #[error("unknown default '{0}'")]
    UnknownDefault(String),

    /// Rule configuration JSON could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
