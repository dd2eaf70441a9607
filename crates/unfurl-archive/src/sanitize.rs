use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Result of sanitizing an archive entry path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizedPath {
    pub original: PathBuf,
    /// Normalized path below the extraction directory. Empty for entries
    /// naming the extraction directory itself, such as `./`.
    pub relative: PathBuf,
    pub resolved: PathBuf,
}

enum Escape {
    Absolute,
    Parent,
}

/// Lexically normalize a relative path, refusing roots, drive prefixes and
/// `..` components that climb above the starting point.
fn normalize_relative(path: &Path) -> std::result::Result<PathBuf, Escape> {
    let mut parts: Vec<&OsStr> = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return Err(Escape::Absolute),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(Escape::Parent);
                }
            }
            Component::Normal(part) => parts.push(part),
        }
    }
    Ok(parts.iter().collect())
}

/// Sanitize an entry path against the extraction directory `base`.
pub fn sanitize_path(entry_path: impl AsRef<Path>, base: impl AsRef<Path>) -> Result<SanitizedPath> {
    let entry_path = entry_path.as_ref();
    let base = base.as_ref();

    if entry_path.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(Error::InvalidPath {
            entry: entry_path.to_string_lossy().into_owned(),
        });
    }

    let relative = normalize_relative(entry_path).map_err(|escape| match escape {
        Escape::Absolute => Error::AbsolutePath {
            entry: entry_path.to_path_buf(),
        },
        Escape::Parent => Error::ZipSlip {
            entry: entry_path.to_path_buf(),
        },
    })?;

    Ok(SanitizedPath {
        original: entry_path.to_path_buf(),
        resolved: base.join(&relative),
        relative,
    })
}

/// Check a symlink target, interpreted from the directory holding the link at
/// `link_relative`. Returns where the target lands relative to the extraction
/// directory.
pub fn sanitize_symlink_target(
    target: impl AsRef<Path>,
    link_relative: impl AsRef<Path>,
) -> Result<PathBuf> {
    let target = target.as_ref();
    let link_relative = link_relative.as_ref();

    if target.has_root() || target.is_absolute() {
        return Err(Error::AbsoluteSymlinkTarget {
            target: target.to_path_buf(),
            symlink: link_relative.to_path_buf(),
        });
    }

    let anchor = link_relative.parent().unwrap_or_else(|| Path::new(""));
    normalize_relative(&anchor.join(target)).map_err(|escape| match escape {
        Escape::Absolute => Error::AbsoluteSymlinkTarget {
            target: target.to_path_buf(),
            symlink: link_relative.to_path_buf(),
        },
        Escape::Parent => Error::SymlinkEscape {
            target: target.to_path_buf(),
            symlink: link_relative.to_path_buf(),
        },
    })
}

/// Check a hard link target. Tar stores these relative to the archive root,
/// not to the link's directory.
pub fn sanitize_hardlink_target(
    target: impl AsRef<Path>,
    link_relative: impl AsRef<Path>,
) -> Result<PathBuf> {
    let target = target.as_ref();
    match normalize_relative(target) {
        Ok(relative) if !relative.as_os_str().is_empty() => Ok(relative),
        _ => Err(Error::HardlinkEscape {
            target: target.to_path_buf(),
            link: link_relative.as_ref().to_path_buf(),
        }),
    }
}

/// Refuse to write below a symlink that an earlier entry planted, since the
/// link could redirect the write anywhere.
pub fn ensure_no_symlink_ancestors(base: &Path, relative: &Path) -> Result<()> {
    let mut current = base.to_path_buf();
    let mut components = relative.components().peekable();
    while let Some(component) = components.next() {
        if components.peek().is_none() {
            break;
        }
        current.push(component);
        if std::fs::symlink_metadata(&current).is_ok_and(|meta| meta.file_type().is_symlink()) {
            return Err(Error::SymlinkTraversal {
                entry: relative.to_path_buf(),
            });
        }
    }
    Ok(())
}
