use std::fmt;
use std::path::Path;

use unfurl_fetch::FetchError;

/// Coarse category of a [`DownloadError`], stable enough to branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The URL does not end in a zip or tar-family suffix.
    UnknownFormat,
    NetworkUnreachable,
    HttpStatus(u16),
    /// A zip was requested but the server did not label it `application/zip`.
    ContentTypeMismatch,
    /// Malformed archive, or one holding entries that are refused on safety
    /// grounds.
    ArchiveUnreadable,
    ArchiveIncomplete,
    /// Local I/O failed: scratch creation, writing or copying.
    Filesystem,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFormat => f.write_str("unknown format"),
            Self::NetworkUnreachable => f.write_str("network unreachable"),
            Self::HttpStatus(status) => write!(f, "http status {status}"),
            Self::ContentTypeMismatch => f.write_str("content type mismatch"),
            Self::ArchiveUnreadable => f.write_str("archive unreadable"),
            Self::ArchiveIncomplete => f.write_str("archive incomplete"),
            Self::Filesystem => f.write_str("filesystem"),
        }
    }
}

type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The single error type of the download pipeline.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DownloadError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Source>,
}

impl DownloadError {
    fn new(kind: ErrorKind, message: String, source: Option<Source>) -> Self {
        Self {
            kind,
            message,
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn unknown_format(source: &str) -> Self {
        Self::new(
            ErrorKind::UnknownFormat,
            format!("Unknown format '{source}'."),
            None,
        )
    }

    pub(crate) fn fetch(url: &str, err: FetchError) -> Self {
        let (kind, message) = match &err {
            FetchError::Unreachable { .. }
            | FetchError::InvalidUrl(_)
            | FetchError::InvalidProxy { .. }
            | FetchError::Client(_) => (
                ErrorKind::NetworkUnreachable,
                format!("Download file from <{url}>, failed. Check internet connection."),
            ),
            FetchError::HttpStatus { status, reason, .. } => (
                ErrorKind::HttpStatus(*status),
                format!("Download file from <{url}>, return status code {status}, {reason}"),
            ),
            FetchError::UnexpectedContentType { expected, actual } => (
                ErrorKind::ContentTypeMismatch,
                format!("Download of <{url}> returned '{actual}', expected '{expected}'"),
            ),
            FetchError::Incomplete { expected, received } => (
                ErrorKind::NetworkUnreachable,
                format!(
                    "Download file from <{url}>, failed after {received} of {expected} bytes. Check internet connection."
                ),
            ),
            FetchError::Write { .. } | FetchError::Fs(_) => (
                ErrorKind::Filesystem,
                format!("Download of <{url}> could not be saved: {err}"),
            ),
        };
        Self::new(kind, message, Some(Box::new(err)))
    }

    pub(crate) fn not_a_zip(url: &str, path: &Path, content_type: Option<&str>) -> Self {
        Self::new(
            ErrorKind::ContentTypeMismatch,
            format!(
                "Download of <{url}> failed or file <{}> is not a ZIP file (content type '{}')",
                path.display(),
                content_type.unwrap_or_default()
            ),
            None,
        )
    }

    pub(crate) fn archive(label: &str, err: unfurl_archive::Error) -> Self {
        let (kind, message) = if err.is_incomplete() {
            (
                ErrorKind::ArchiveIncomplete,
                format!("{label} is incomplete: {err}"),
            )
        } else if err.is_local_io() {
            (
                ErrorKind::Filesystem,
                format!("{label} could not be extracted: {err}"),
            )
        } else {
            (
                ErrorKind::ArchiveUnreadable,
                format!("{label} is unreadable: {err}"),
            )
        };
        Self::new(kind, message, Some(Box::new(err)))
    }

    pub(crate) fn filesystem(context: impl fmt::Display, err: impl Into<Source>) -> Self {
        let err = err.into();
        Self::new(
            ErrorKind::Filesystem,
            format!("{context}: {err}"),
            Some(err),
        )
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
