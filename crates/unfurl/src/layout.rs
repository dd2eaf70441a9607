use std::path::Path;

use unfurl_archive::ExtractionListing;
use unfurl_fs::{Error, Result, Workspace, copy_dir_all, copy_file, copy_symlink};

/// Where a lone extracted file ends up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoneFile {
    /// The target path becomes the file itself.
    #[default]
    AsTarget,
    /// The target is a directory holding the file under its own name.
    IntoDirectory,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    pub lone_file: LoneFile,
}

impl LayoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lone_file(mut self, lone_file: LoneFile) -> Self {
        self.lone_file = lone_file;
        self
    }
}

/// Shape of the extracted tree, as found by [`normalize_layout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// One top-level directory; its contents became the target.
    Wrapped,
    /// One top-level file.
    LoneFile,
    /// Zero or several top-level entries, copied side by side.
    Flat,
}

/// Copy an extraction directory onto `target` so that callers never see the
/// archive's own wrapper directory.
///
/// A fresh target is built in a hidden sibling and renamed into place on
/// success; on failure the sibling is removed and `target` does not appear.
/// Several top-level entries are merged into an existing target directory.
pub fn normalize_layout(
    extract_dir: &Path,
    target: &Path,
    listing: &ExtractionListing,
    options: LayoutOptions,
) -> Result<Layout> {
    tracing::debug!(
        extract_dir = %extract_dir.display(),
        target = %target.display(),
        entries = listing.len(),
        "normalizing layout"
    );

    if let Some(name) = listing.single() {
        let source = extract_dir.join(name);
        let meta = std::fs::symlink_metadata(&source).map_err(|e| Error::Read {
            path: source.clone(),
            source: e,
        })?;

        if meta.is_dir() {
            ensure_absent(target)?;
            let workspace = Workspace::beside(target)?;
            copy_dir_all(&source, workspace.path())?;
            workspace.commit()?;
            return Ok(Layout::Wrapped);
        }

        match options.lone_file {
            LoneFile::AsTarget => {
                ensure_absent(target)?;
                let workspace = Workspace::beside(target)?;
                copy_entry(&source, workspace.path(), meta.file_type().is_symlink())?;
                workspace.commit()?;
            }
            LoneFile::IntoDirectory => copy_entries(extract_dir, target, listing)?,
        }
        return Ok(Layout::LoneFile);
    }

    copy_entries(extract_dir, target, listing)?;
    Ok(Layout::Flat)
}

fn ensure_absent(target: &Path) -> Result<()> {
    match std::fs::symlink_metadata(target) {
        Ok(_) => Err(Error::AlreadyExists {
            path: target.to_path_buf(),
        }),
        Err(_) => Ok(()),
    }
}

/// Copy every listed entry into the directory `target`, staging it first when
/// it does not exist yet.
fn copy_entries(extract_dir: &Path, target: &Path, listing: &ExtractionListing) -> Result<()> {
    if std::fs::symlink_metadata(target).is_ok() {
        if !target.is_dir() {
            return Err(Error::AlreadyExists {
                path: target.to_path_buf(),
            });
        }
        return merge_into(extract_dir, target, listing);
    }

    let workspace = Workspace::beside(target)?;
    std::fs::create_dir(workspace.path()).map_err(|e| Error::Write {
        path: workspace.path().to_path_buf(),
        source: e,
    })?;
    merge_into(extract_dir, workspace.path(), listing)?;
    workspace.commit()?;
    Ok(())
}

fn merge_into(extract_dir: &Path, dest: &Path, listing: &ExtractionListing) -> Result<()> {
    for name in listing.iter() {
        let source = extract_dir.join(name);
        let file_type = std::fs::symlink_metadata(&source)
            .map_err(|e| Error::Read {
                path: source.clone(),
                source: e,
            })?
            .file_type();
        let dest_path = dest.join(name);
        tracing::trace!(entry = %name.to_string_lossy(), "copying top-level entry");
        if file_type.is_dir() {
            copy_dir_all(&source, &dest_path)?;
        } else {
            copy_entry(&source, &dest_path, file_type.is_symlink())?;
        }
    }
    Ok(())
}

fn copy_entry(source: &Path, dest: &Path, is_symlink: bool) -> Result<()> {
    if is_symlink {
        copy_symlink(source, dest)
    } else {
        copy_file(source, dest)
    }
}
