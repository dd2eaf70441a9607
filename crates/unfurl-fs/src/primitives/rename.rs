use crate::{Error, Result};
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub struct RenameOptions {
    pub retry_count: u32,
    pub retry_delay: Duration,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            retry_count: 5,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl RenameOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Move a staged file or directory onto `dest`, which must not exist.
///
/// On Windows a freshly written tree can be briefly locked by indexers and
/// scanners, so the rename is retried with a growing delay there.
pub fn rename_into_place(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: RenameOptions,
) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if std::fs::symlink_metadata(dest).is_ok() {
        return Err(Error::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }

    #[cfg(not(windows))]
    {
        let _ = options;
        std::fs::rename(src, dest).map_err(|e| Error::Commit {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            source: e,
        })
    }

    #[cfg(windows)]
    {
        let mut attempts = 0;
        loop {
            match std::fs::rename(src, dest) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    attempts += 1;
                    if attempts >= options.retry_count {
                        return Err(Error::Commit {
                            from: src.to_path_buf(),
                            to: dest.to_path_buf(),
                            source: e,
                        });
                    }
                    std::thread::sleep(options.retry_delay * attempts);
                }
            }
        }
    }
}
