//! Unified error handling.
//!
//! Every failure in the crate is a data or validation problem, never a
//! transient one, so nothing here is retried. Errors stay local to the
//! dataset or category that produced them.

use thiserror::Error;

/// Errors produced while loading datasets or answering a search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProximityError {
    /// A required column is missing, or no recognised alias was found for it.
    #[error("schema error in {dataset}: {message}")]
    Schema { dataset: String, message: String },

    /// The dataset could not be read, is empty, or holds malformed values.
    #[error("failed to load {dataset}: {message}")]
    DataLoad { dataset: String, message: String },

    /// The request was rejected before any computation started.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A category key or display label outside the closed set.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

impl ProximityError {
    pub(crate) fn schema(dataset: &str, message: impl Into<String>) -> Self {
        Self::Schema {
            dataset: dataset.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn data_load(dataset: &str, message: impl Into<String>) -> Self {
        Self::DataLoad {
            dataset: dataset.to_string(),
            message: message.into(),
        }
    }

    /// True for errors that exclude a category from results entirely.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProximityError>;

/// Convenience conversions from `Option` into crate errors.
pub trait OptionExt<T> {
    /// Turn a missing header column into a [`ProximityError::Schema`].
    fn ok_or_schema(self, dataset: &str, message: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_schema(self, dataset: &str, message: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| ProximityError::schema(dataset, message))
    }
}
