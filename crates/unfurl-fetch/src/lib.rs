//! Blocking HTTP retrieval with progress reporting and staged placement.
//!
//! # Architecture
//!
//! - [`HttpClient`] - Trait seam over the transport, [`ReqwestClient`] in production
//! - [`ClientConfig`] / [`ProxyConfig`] - Per-client transport settings
//! - [`retrieve`] / [`download_file`] - Stream a body to disk in fixed blocks
//!
//! A body is written to a hidden sibling of its destination and renamed into
//! place only when complete.

mod config;
mod error;
mod http;
mod options;
mod progress;
mod retrieve;

pub use config::{ClientConfig, DEFAULT_USER_AGENT, ProxyConfig};
pub use error::{FetchError, Result};
pub use http::{HttpClient, Response, canonical_reason};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use options::FetchOptions;
pub use progress::Progress;
pub use retrieve::{BLOCK_SIZE, Retrieved, download_file, retrieve};
