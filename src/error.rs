//! @acp:module "Errors"
//! @acp:summary "Error taxonomy for loading, parsing, projection and resolution"
//! @acp:domain schema
//! @acp:layer model
//!
//! Construction-time failures (load, parse) abort building a parser.
//! Configuration and client failures are scoped to the single operation
//! that raised them and never touch shared parser state.

use std::path::PathBuf;

use thiserror::Error;

use crate::parse::literal::LiteralError;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ApiError>;

/// Coarse classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Source or version index could not be read
    Load,
    /// Source text is empty or structurally invalid
    Parse,
    /// Caller asked for something that was not configured
    Configuration,
    /// Downstream client failed
    Client,
}

/// @acp:summary "All errors raised by the library"
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Cannot load Elastic API source file from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot load Elastic API file with available versions from {}: {source}", path.display())]
    ApiListLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can not find Elastic version '{version}' in {}", index.display())]
    UnknownVersion { version: String, index: PathBuf },

    #[error("Empty source. It should be non-empty string.")]
    EmptySource,

    #[error("Incorrect response from comment tokenizer: {0}")]
    Tokenizer(String),

    #[error("Invalid settings literal: {0}")]
    Literal(#[from] LiteralError),

    #[error("You should provide Elastic search method.")]
    MissingMethodName,

    #[error("Elastic search method '{0}' does not exists.")]
    UnknownMethod(String),

    #[error(
        "You should provide `elasticClient` when created types via \
         bound client or in runtime via the request context"
    )]
    MissingClient,

    #[error("GraphQL schema rejected: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Classify the error into the load/parse/configuration/client buckets
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::Load { .. }
            | ApiError::ApiListLoad { .. }
            | ApiError::UnknownVersion { .. }
            | ApiError::Io(_) => ErrorCategory::Load,
            ApiError::EmptySource
            | ApiError::Tokenizer(_)
            | ApiError::Literal(_)
            | ApiError::Json(_) => ErrorCategory::Parse,
            ApiError::MissingMethodName
            | ApiError::UnknownMethod(_)
            | ApiError::MissingClient
            | ApiError::Schema(_)
            | ApiError::Config(_) => ErrorCategory::Configuration,
            ApiError::Client(_) => ErrorCategory::Client,
        }
    }
}

/// @acp:summary "Errors raised by a downstream API client"
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Elasticsearch responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unknown API method '{0}'")]
    UnknownMethod(String),

    #[error("No URL of '{method}' can be built from the given arguments")]
    NoMatchingUrl { method: String },

    #[error("Invalid host URL '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("Unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(ApiError::EmptySource.category(), ErrorCategory::Parse);
        assert_eq!(ApiError::MissingClient.category(), ErrorCategory::Configuration);
        assert_eq!(
            ApiError::UnknownMethod("foo".into()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            ApiError::Client(ClientError::UnknownMethod("x".into())).category(),
            ErrorCategory::Client
        );
    }

    #[test]
    fn test_load_error_names_path() {
        let err = ApiError::Load {
            path: PathBuf::from("/tmp/missing.js"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        };
        assert!(err.to_string().contains("/tmp/missing.js"));
        assert_eq!(err.category(), ErrorCategory::Load);
    }
}
