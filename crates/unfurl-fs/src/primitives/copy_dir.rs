use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Recursively copy `src` into `dest`, merging with whatever already lives there.
///
/// Directories that exist at the destination are descended into rather than
/// rejected, regular files overwrite, and symlinks are recreated as symlinks
/// with the same (unresolved) target. Children are visited in name order so
/// two copies of the same tree are produced identically.
pub fn copy_dir_all(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if !dest.exists() {
        fs::create_dir_all(dest).map_err(|e| Error::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;
    }

    let mut entries = fs::read_dir(src)
        .map_err(|e| Error::Read {
            path: src.to_path_buf(),
            source: e,
        })?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::Read {
            path: src.to_path_buf(),
            source: e,
        })?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_type = entry.file_type().map_err(|e| Error::Read {
            path: entry.path(),
            source: e,
        })?;

        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_all(&src_path, &dest_path)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src_path, &dest_path)?;
        } else {
            copy_file(&src_path, &dest_path)?;
        }
    }
    Ok(())
}

/// Copy a single file, overwriting `dest`.
pub fn copy_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    fs::copy(src, dest).map(drop).map_err(|e| Error::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}

/// Recreate the symlink at `src` as `dest`, replacing an existing link or file.
pub fn copy_symlink(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();
    let target = fs::read_link(src).map_err(|e| Error::Read {
        path: src.to_path_buf(),
        source: e,
    })?;

    if let Ok(meta) = fs::symlink_metadata(dest) {
        if !meta.is_dir() {
            fs::remove_file(dest).map_err(|e| Error::Write {
                path: dest.to_path_buf(),
                source: e,
            })?;
        }
    }
    crate::primitives::symlink::symlink(target, dest)
}
