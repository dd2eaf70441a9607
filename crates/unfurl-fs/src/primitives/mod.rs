pub mod copy_dir;
pub mod hardlink;
pub mod rename;
pub mod symlink;

pub use copy_dir::{copy_dir_all, copy_file, copy_symlink};
pub use hardlink::{FallbackStrategy, HardlinkOrCopyOptions, hardlink_or_copy};
pub use rename::{RenameOptions, rename_into_place};
pub use symlink::symlink;
