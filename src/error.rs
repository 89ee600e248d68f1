//! Error types for the Pulse health core

use thiserror::Error;

use crate::progress::Category;

#[derive(Error, Debug)]
pub enum Error {
    /// No resolvable user context. Aborts an aggregation before any fetch.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// A single category read failed. The aggregator scores it as 0.
    #[error("Failed to fetch {category} data: {reason}")]
    DataFetchFailed { category: Category, reason: String },

    /// A fetched record did not match its expected shape.
    #[error("Malformed {collection} record {id}: {reason}")]
    MalformedRecord {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Firestore error: {0}")]
    Firestore(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Attach a category to a lower-level failure.
    pub fn fetch_failed(category: Category, err: impl std::fmt::Display) -> Self {
        Error::DataFetchFailed {
            category,
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
