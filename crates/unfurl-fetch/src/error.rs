//! Error types for unfurl-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid proxy specification '{spec}': {reason}")]
    InvalidProxy { spec: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("could not reach {url} (check internet connection): {reason}")]
    Unreachable { url: String, reason: String },

    #[error("HTTP {status} {reason} for {url}")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("expected content type containing '{expected}', server sent '{actual}'")]
    UnexpectedContentType { expected: String, actual: String },

    #[error("download incomplete: received {received} of {expected} bytes")]
    Incomplete { expected: u64, received: u64 },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Fs(#[from] unfurl_fs::Error),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
