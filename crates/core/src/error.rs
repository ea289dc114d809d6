//! Unified error types for policy-desk.
//!
//! Every variant carries a stable code prefix so a front end can tell
//! "document not found" apart from "upstream unreachable".

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the policy-desk pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty identifier).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Category key is not part of the catalog.
    #[error("UNKNOWN_CATEGORY: {0}")]
    UnknownCategory(String),

    /// No listing entry matched the requested identifier.
    #[error("UNRESOLVED_DOCUMENT: {category}/{identifier}")]
    UnresolvedDocument { category: String, identifier: String },

    /// Network or transport failure, including non-success HTTP status.
    #[error("FETCH_ERROR: {0}")]
    Fetch(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Upstream content is not a parseable document of the expected type.
    #[error("FORMAT_ERROR: {0}")]
    Format(String),

    /// Document parsed but yielded no text.
    #[error("EMPTY_DOCUMENT: {0}")]
    EmptyDocument(String),

    /// Search query was empty or whitespace only.
    #[error("EMPTY_QUERY")]
    EmptyQuery,

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Cache file or its directory could not be prepared.
    #[error("CACHE_ERROR: {path}: {source}")]
    Storage { path: String, source: std::io::Error },
}

impl Error {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Error::UnresolvedDocument { .. } => "UNRESOLVED_DOCUMENT",
            Error::Fetch(_) => "FETCH_ERROR",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::FetchTooLarge(_) => "FETCH_TOO_LARGE",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Format(_) => "FORMAT_ERROR",
            Error::EmptyDocument(_) => "EMPTY_DOCUMENT",
            Error::EmptyQuery => "EMPTY_QUERY",
            Error::Database(_) | Error::MigrationFailed(_) | Error::Storage { .. } => "CACHE_ERROR",
        }
    }

    /// Whether a caller may reasonably retry the request later.
    ///
    /// Only transport failures qualify; the pipeline itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Fetch(_) | Error::FetchTimeout(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::EmptyQuery => -32602,
            Error::UnknownCategory(_) => -32010,
            Error::UnresolvedDocument { .. } => -32011,
            Error::Fetch(_) => -32008,
            Error::FetchTimeout(_) => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::InvalidUrl(_) => -32003,
            Error::Format(_) => -32012,
            Error::EmptyDocument(_) => -32013,
            Error::Database(_) | Error::MigrationFailed(_) | Error::Storage { .. } => -32002,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
