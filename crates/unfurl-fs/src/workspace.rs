use crate::primitives::{RenameOptions, rename_into_place};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A staging location that becomes `destination` only on [`Workspace::commit`].
///
/// Nothing is created up front: the caller builds a file or a directory at
/// [`Workspace::path`]. Dropping an uncommitted workspace removes whatever was
/// staged, so the destination never observes a half-built result.
#[derive(Debug)]
pub struct Workspace {
    staging_path: PathBuf,
    destination_path: PathBuf,
    committed: bool,
}

impl Workspace {
    pub fn new(staging: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Self> {
        let staging_path = staging.as_ref().to_path_buf();
        let destination_path = destination.as_ref().to_path_buf();

        if std::fs::symlink_metadata(&staging_path).is_ok() {
            return Err(Error::AlreadyExists { path: staging_path });
        }

        Ok(Self {
            staging_path,
            destination_path,
            committed: false,
        })
    }

    /// Stage next to `destination` as a hidden `.<name>.partial` sibling, so the
    /// final rename never crosses a filesystem boundary.
    pub fn beside(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref();
        let name = destination.file_name().ok_or_else(|| Error::NoFileName {
            path: destination.to_path_buf(),
        })?;
        let mut staged = std::ffi::OsString::from(".");
        staged.push(name);
        staged.push(".partial");
        Self::new(destination.with_file_name(staged), destination)
    }

    pub fn path(&self) -> &Path {
        &self.staging_path
    }

    pub fn destination(&self) -> &Path {
        &self.destination_path
    }

    pub fn commit(mut self) -> Result<PathBuf> {
        rename_into_place(
            &self.staging_path,
            &self.destination_path,
            RenameOptions::default(),
        )?;
        self.committed = true;
        tracing::trace!(destination = %self.destination_path.display(), "workspace committed");
        Ok(self.destination_path.clone())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::symlink_metadata(&self.staging_path) {
            Ok(meta) if meta.is_dir() => {
                let _ = std::fs::remove_dir_all(&self.staging_path);
            }
            Ok(_) => {
                let _ = std::fs::remove_file(&self.staging_path);
            }
            Err(_) => {}
        }
    }
}
