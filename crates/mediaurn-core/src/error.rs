//! Error types for Mediaurn Core

use crate::types::BlockReason;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, Error>;

/// Resolution error types
#[derive(Error, Debug)]
pub enum Error {
    // Input errors
    #[error("No media URN supplied")]
    MissingUrn,

    // Metadata errors
    #[error("Failed to fetch media composition: {url} ({status_text})")]
    MetadataFetch {
        url: String,
        status: Option<u16>,
        status_text: String,
    },

    #[error("Failed to parse media composition: {0}")]
    MetadataParse(String),

    // Token errors
    #[error("Failed to tokenize resource: {url} ({status_text})")]
    TokenFetch {
        url: String,
        status: Option<u16>,
        status_text: String,
    },

    // Selection errors
    #[error("Content is blocked: {reason}")]
    Blocked { reason: BlockReason },

    #[error("No compatible resource found")]
    NoCompatibleResource,

    // Network errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Details of a failed HTTP request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFailure {
    pub url: String,
    pub status: Option<u16>,
    pub status_text: String,
}

impl Error {
    /// Build a metadata fetch error from a transport failure
    pub fn metadata_transport(url: impl Into<String>, err: &reqwest::Error) -> Self {
        Error::MetadataFetch {
            url: url.into(),
            status: err.status().map(|s| s.as_u16()),
            status_text: err.to_string(),
        }
    }

    /// Build a token fetch error from a transport failure
    pub fn token_transport(url: impl Into<String>, err: &reqwest::Error) -> Self {
        Error::TokenFetch {
            url: url.into(),
            status: err.status().map(|s| s.as_u16()),
            status_text: err.to_string(),
        }
    }

    /// Returns the failed request when the error came from an HTTP call
    pub fn request_failure(&self) -> Option<RequestFailure> {
        match self {
            Error::MetadataFetch { url, status, status_text }
            | Error::TokenFetch { url, status, status_text } => Some(RequestFailure {
                url: url.clone(),
                status: *status,
                status_text: status_text.clone(),
            }),
            Error::Network(err) => err.url().map(|url| RequestFailure {
                url: url.to_string(),
                status: err.status().map(|s| s.as_u16()),
                status_text: err.to_string(),
            }),
            _ => None,
        }
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingUrn => "MISSING_URN",
            Error::MetadataFetch { .. } => "METADATA_FETCH",
            Error::MetadataParse(_) => "METADATA_PARSE",
            Error::TokenFetch { .. } => "TOKEN_FETCH",
            Error::Blocked { .. } => "BLOCKED",
            Error::NoCompatibleResource => "NO_COMPATIBLE_RESOURCE",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Network(_) => "NETWORK",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Io(_) => "IO",
        }
    }
}
