//! Filesystem primitives used by the unfurl pipeline.
//!
//! - `primitives/` - merge copies, symlink recreation, hard links, renames
//! - `workspace.rs` - staged results that only appear at their destination on commit

mod error;
pub mod primitives;
mod workspace;

pub use error::{Error, Result};
pub use primitives::{
    FallbackStrategy, HardlinkOrCopyOptions, RenameOptions, copy_dir_all, copy_file,
    copy_symlink, hardlink_or_copy, rename_into_place, symlink,
};
pub use workspace::Workspace;
