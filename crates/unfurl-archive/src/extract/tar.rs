use std::cell::Cell;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use unfurl_fs::HardlinkOrCopyOptions;

use super::{Tally, create_directory, prepare_slot, write_file};
use crate::error::{Error, Result};
use crate::format::TarCompress;
use crate::permissions::apply_file_mode;
use crate::sanitize::{
    ensure_no_symlink_ancestors, sanitize_hardlink_target, sanitize_path, sanitize_symlink_target,
};

/// What the extractor has seen of the decompressed stream. A parse failure
/// reads as truncation only after a valid header went by and the stream ran
/// dry; anything before the first header is not a tar archive at all.
#[derive(Debug, Default)]
struct StreamState {
    hit_eof: Cell<bool>,
    consumed: Cell<u64>,
    headers: Cell<usize>,
}

impl StreamState {
    fn error(&self, err: io::Error) -> Error {
        let ran_dry = self.hit_eof.get() || err.kind() == io::ErrorKind::UnexpectedEof;
        if ran_dry && self.headers.get() > 0 {
            Error::Incomplete {
                reason: err.to_string(),
            }
        } else {
            Error::Unreadable {
                reason: err.to_string(),
            }
        }
    }
}

struct EofTracker<R> {
    inner: R,
    state: Rc<StreamState>,
}

impl<R: Read> Read for EofTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(0) if !buf.is_empty() => {
                self.state.hit_eof.set(true);
                Ok(0)
            }
            Ok(n) => {
                let consumed = &self.state.consumed;
                consumed.set(consumed.get() + n as u64);
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                self.state.hit_eof.set(true);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

pub(super) struct TarExtractor {
    codec: TarCompress,
}

impl TarExtractor {
    pub(super) fn new(codec: TarCompress) -> Self {
        Self { codec }
    }

    pub(super) fn extract<R: Read>(&self, reader: R, destination: &Path) -> Result<Tally> {
        let state = Rc::new(StreamState::default());
        let stream = EofTracker {
            inner: self.codec.decoder(reader)?,
            state: Rc::clone(&state),
        };
        let broken = |err: io::Error| state.error(err);

        let mut archive = ::tar::Archive::new(stream);
        let mut tally = Tally::default();
        for entry in archive.entries().map_err(&broken)? {
            let mut entry = entry.map_err(&broken)?;
            state.headers.set(state.headers.get() + 1);
            unpack_entry(&mut entry, destination, &broken, &mut tally)?;
        }

        // end-of-archive blocks alone still make a valid, empty tar
        if state.headers.get() == 0 && state.consumed.get() == 0 {
            return Err(Error::Unreadable {
                reason: "empty archive".to_string(),
            });
        }
        Ok(tally)
    }
}

fn link_target<R: Read>(entry: &::tar::Entry<'_, R>, raw_path: &Path) -> Result<PathBuf> {
    let invalid = || Error::InvalidPath {
        entry: raw_path.display().to_string(),
    };
    entry
        .link_name()
        .map_err(|_| invalid())?
        .map(|target| target.into_owned())
        .ok_or_else(invalid)
}

fn unpack_entry<R: Read>(
    entry: &mut ::tar::Entry<'_, R>,
    base: &Path,
    broken: &dyn Fn(io::Error) -> Error,
    tally: &mut Tally,
) -> Result<()> {
    let entry_type = entry.header().entry_type();
    if entry_type.is_pax_global_extensions() || entry_type.is_pax_local_extensions() {
        tracing::trace!("skipping pax extension header");
        return Ok(());
    }

    let raw_path = entry
        .path()
        .map_err(|_| Error::InvalidPath {
            entry: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
        })?
        .into_owned();
    let sanitized = sanitize_path(&raw_path, base)?;
    let relative = sanitized.relative.as_path();
    let resolved = sanitized.resolved.as_path();

    if relative.as_os_str().is_empty() {
        if entry_type.is_dir() {
            return Ok(());
        }
        return Err(Error::InvalidPath {
            entry: raw_path.display().to_string(),
        });
    }

    if entry_type.is_dir() {
        tracing::trace!(entry = %relative.display(), "directory");
        create_directory(base, relative, resolved)?;
        tally.record(0);
    } else if entry_type.is_file() || entry_type.is_contiguous() || entry_type.is_gnu_sparse() {
        let expected = entry.size();
        let mode = entry.header().mode().ok();
        let written = write_file(entry, base, relative, resolved, broken)?;
        if written < expected {
            return Err(Error::Incomplete {
                reason: format!(
                    "'{}' ends after {written} of {expected} bytes",
                    raw_path.display()
                ),
            });
        }
        apply_file_mode(resolved, mode)?;
        tracing::trace!(entry = %relative.display(), bytes = written, "file");
        tally.record(written);
    } else if entry_type.is_symlink() {
        let target = link_target(entry, &raw_path)?;
        sanitize_symlink_target(&target, relative)?;
        create_symlink(base, relative, resolved, &target)?;
        tally.record(0);
    } else if entry_type.is_hard_link() {
        let target = link_target(entry, &raw_path)?;
        let source_relative = sanitize_hardlink_target(&target, relative)?;
        ensure_no_symlink_ancestors(base, &source_relative)?;
        let source = base.join(&source_relative);
        match std::fs::symlink_metadata(&source) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(Error::SymlinkTraversal {
                    entry: relative.to_path_buf(),
                });
            }
            Ok(meta) if meta.is_file() => {}
            _ => {
                return Err(Error::Unreadable {
                    reason: format!(
                        "hard link '{}' points at '{}', which is not an earlier file entry",
                        raw_path.display(),
                        target.display()
                    ),
                });
            }
        }
        prepare_slot(base, relative, resolved)?;
        unfurl_fs::hardlink_or_copy(&source, resolved, HardlinkOrCopyOptions::new())?;
        tracing::trace!(entry = %relative.display(), target = %source_relative.display(), "hard link");
        tally.record(0);
    } else {
        let kind = if entry_type.is_character_special() {
            "character device"
        } else if entry_type.is_block_special() {
            "block device"
        } else if entry_type.is_fifo() {
            "fifo"
        } else {
            "unsupported entry type"
        };
        return Err(Error::UnsafeEntry {
            entry: raw_path,
            kind,
        });
    }

    Ok(())
}

#[cfg(unix)]
fn create_symlink(base: &Path, relative: &Path, resolved: &Path, target: &Path) -> Result<()> {
    prepare_slot(base, relative, resolved)?;
    unfurl_fs::symlink(target, resolved)?;
    tracing::trace!(entry = %relative.display(), target = %target.display(), "symlink");
    Ok(())
}

#[cfg(not(unix))]
fn create_symlink(_base: &Path, relative: &Path, _resolved: &Path, target: &Path) -> Result<()> {
    tracing::warn!(
        entry = %relative.display(),
        target = %target.display(),
        "symlinks are not extracted on this platform"
    );
    Ok(())
}
