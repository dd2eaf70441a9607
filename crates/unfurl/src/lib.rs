//! Download an archive from a URL, unpack it into a scratch directory and
//! hand back a directory whose layout no longer depends on how the archive
//! was packed.
//!
//! # Architecture
//!
//! - `classify.rs` - Archive kind from the URL's file name
//! - `pipeline.rs` - [`Downloader`], the fetch, extract and normalize sequence
//! - `layout.rs` - Wrapper-directory stripping and staged placement
//! - `diagnostics.rs` - Leveled message sinks
//! - `error.rs` - [`DownloadError`] and its [`ErrorKind`]
//!
//! Fetching lives in `unfurl-fetch`, extraction in `unfurl-archive` and the
//! staging primitives in `unfurl-fs`.

mod classify;
mod diagnostics;
mod error;
mod layout;
mod name;
mod pipeline;

pub use classify::{ArchiveKind, TAR_EXTENSIONS, ZIP_CONTENT_TYPE, classify};
pub use diagnostics::{DiagnosticSink, NullSink, TracingSink};
pub use error::{DownloadError, ErrorKind, Result};
pub use layout::{Layout, LayoutOptions, LoneFile, normalize_layout};
pub use name::name_from_url;
pub use pipeline::{Downloader, EXTRACT_DIR, TARGET_DIR, download_and_extract};

pub use unfurl_fetch::{
    ClientConfig, FetchOptions, HttpClient, Progress, ProxyConfig, ReqwestClient,
};
