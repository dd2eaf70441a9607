//! Archive extraction with path sanitization and truncation detection.
//!
//! # Architecture
//!
//! - `format.rs` - Compression sniffing and stream decoders
//! - `sanitize.rs` - Entry path and link target checks (zip-slip prevention)
//! - `permissions.rs` - Mode reduction for extracted files
//! - `listing.rs` - Sorted top-level view of an extraction directory
//! - `extract/` - Per-format implementations

pub use error::{Error, Result};
#[cfg(feature = "tar")]
pub use extract::extract_tar;
#[cfg(feature = "zip")]
pub use extract::extract_zip;
pub use extract::Extraction;
#[cfg(feature = "tar")]
pub use format::Decoder;
pub use format::{ArchiveFormat, TarCompress, detect_compression, sniff_compression};
pub use listing::ExtractionListing;
pub use permissions::sanitize_file_mode;
pub use sanitize::{
    SanitizedPath, sanitize_hardlink_target, sanitize_path, sanitize_symlink_target,
};

mod error;
mod extract;
mod format;
mod listing;
mod permissions;
mod sanitize;
