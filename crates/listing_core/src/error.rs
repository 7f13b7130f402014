use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification shared by every error the extractor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidInput,
    DocumentLoadFailure,
    MissingPrice,
    MissingTitle,
    PartialParseFailure,
}

/// Failure surfaced to the caller of a single extraction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("document could not be loaded: {reason}")]
    DocumentLoadFailure { reason: String },
    #[error("listing has no price")]
    MissingPrice,
    #[error("listing has no title")]
    MissingTitle,
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::InvalidInput(_) => ErrorKind::InvalidInput,
            ExtractionError::DocumentLoadFailure { .. } => ErrorKind::DocumentLoadFailure,
            ExtractionError::MissingPrice => ErrorKind::MissingPrice,
            ExtractionError::MissingTitle => ErrorKind::MissingTitle,
        }
    }
}

/// An embedded structured-data block that is not valid JSON.
///
/// Never surfaced by [`crate::ListingExtractor`]; the block is skipped and the
/// remaining blocks are still inspected.
#[derive(Debug, Error)]
#[error("structured data block #{index} is not valid JSON: {source}")]
pub struct BlockParseError {
    pub index: usize,
    #[source]
    pub source: serde_json::Error,
}

impl BlockParseError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::PartialParseFailure
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid {field} selector `{selector}`: {message}")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        message: String,
    },
}
