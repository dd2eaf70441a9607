use std::io::{self, Read, Seek};
use std::path::Path;

use ::zip::result::ZipError;

use super::{Tally, create_directory, write_file};
use crate::error::{Error, Result};
use crate::permissions::apply_file_mode;
use crate::sanitize::sanitize_path;

/// A zip is read through its central directory, so a short or damaged file
/// is a broken archive rather than a truncated stream.
fn read_error(err: io::Error) -> Error {
    Error::Unreadable {
        reason: err.to_string(),
    }
}

fn archive_error(err: ZipError) -> Error {
    Error::Unreadable {
        reason: err.to_string(),
    }
}

pub(super) struct ZipExtractor;

impl ZipExtractor {
    pub(super) fn extract<R: Read + Seek>(&self, reader: R, destination: &Path) -> Result<Tally> {
        let mut archive = ::zip::ZipArchive::new(reader).map_err(archive_error)?;
        let mut tally = Tally::default();

        for index in 0..archive.len() {
            let mut file = archive.by_index(index).map_err(archive_error)?;
            let name = file.name().to_owned();
            let sanitized = sanitize_path(&name, destination)?;
            if file.enclosed_name().is_none() {
                return Err(Error::InvalidPath { entry: name });
            }

            let relative = sanitized.relative.as_path();
            let resolved = sanitized.resolved.as_path();
            if relative.as_os_str().is_empty() {
                continue;
            }

            if file.is_dir() {
                create_directory(destination, relative, resolved)?;
                tally.record(0);
            } else {
                let mode = file.unix_mode();
                // a bad CRC surfaces as a read error once the entry is drained
                let written = write_file(&mut file, destination, relative, resolved, &read_error)?;
                apply_file_mode(resolved, mode)?;
                tracing::trace!(entry = %relative.display(), bytes = written, "file");
                tally.record(written);
            }
        }

        Ok(tally)
    }
}
