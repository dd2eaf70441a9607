use crate::{Error, Result};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackStrategy {
    /// Copy the file when a hard link cannot be created.
    #[default]
    Copy,
    Error,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HardlinkOrCopyOptions {
    pub fallback: FallbackStrategy,
}

impl HardlinkOrCopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Hard link `src` to `dest`, copying instead when the filesystem refuses.
pub fn hardlink_or_copy(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: HardlinkOrCopyOptions,
) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    match std::fs::hard_link(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::Read {
            path: src.to_path_buf(),
            source: e,
        }),
        Err(e) => match options.fallback {
            FallbackStrategy::Copy => {
                tracing::debug!(src = %src.display(), error = %e, "hard link failed, copying");
                std::fs::copy(src, dest).map(drop).map_err(|e| Error::Write {
                    path: dest.to_path_buf(),
                    source: e,
                })
            }
            FallbackStrategy::Error if e.kind() == std::io::ErrorKind::CrossesDevices => {
                Err(Error::CrossDeviceHardlink {
                    path: dest.to_path_buf(),
                })
            }
            FallbackStrategy::Error => Err(Error::Write {
                path: dest.to_path_buf(),
                source: e,
            }),
        },
    }
}
