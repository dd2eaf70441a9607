use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::format::ArchiveFormat;
use crate::listing::ExtractionListing;
use crate::sanitize::ensure_no_symlink_ancestors;

#[cfg(feature = "tar")]
mod tar;
#[cfg(feature = "zip")]
mod zip;

const COPY_BUFFER_SIZE: usize = 8192;

/// Summary of a finished extraction.
#[derive(Clone, Debug)]
pub struct Extraction {
    pub format: ArchiveFormat,
    pub root: PathBuf,
    pub entry_count: usize,
    pub total_bytes: u64,
    pub listing: ExtractionListing,
}

#[derive(Debug, Default)]
pub(crate) struct Tally {
    entries: usize,
    bytes: u64,
}

impl Tally {
    fn record(&mut self, bytes: u64) {
        self.entries += 1;
        self.bytes += bytes;
    }
}

/// Extract a tar archive, plain or compressed, into the fresh directory
/// `destination`. The compression is recognised from the file's leading bytes.
#[cfg(feature = "tar")]
pub fn extract_tar(archive: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Extraction> {
    let archive = archive.as_ref();
    let destination = destination.as_ref();

    let mut file = open_archive(archive)?;
    let codec = crate::format::sniff_compression(&mut file).map_err(|e| Error::ExtractionFailed {
        path: archive.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(archive = %archive.display(), %codec, "extracting tar archive");

    create_destination(destination)?;
    let tally = tar::TarExtractor::new(codec).extract(io::BufReader::new(file), destination)?;
    finish(ArchiveFormat::Tar(codec), destination, tally)
}

/// Extract a zip archive into the fresh directory `destination`.
#[cfg(feature = "zip")]
pub fn extract_zip(archive: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Extraction> {
    let archive = archive.as_ref();
    let destination = destination.as_ref();

    let file = open_archive(archive)?;
    tracing::debug!(archive = %archive.display(), "extracting zip archive");

    create_destination(destination)?;
    let tally = zip::ZipExtractor.extract(io::BufReader::new(file), destination)?;
    finish(ArchiveFormat::Zip, destination, tally)
}

fn open_archive(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::ExtractionFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn create_destination(destination: &Path) -> Result<()> {
    match std::fs::create_dir(destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(Error::DestinationExists {
            path: destination.to_path_buf(),
        }),
        Err(e) => Err(Error::DirectoryCreationFailed {
            path: destination.to_path_buf(),
            source: e,
        }),
    }
}

fn finish(format: ArchiveFormat, destination: &Path, tally: Tally) -> Result<Extraction> {
    let listing = ExtractionListing::read(destination).map_err(|e| Error::ExtractionFailed {
        path: destination.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(
        %format,
        entries = tally.entries,
        bytes = tally.bytes,
        top_level = listing.len(),
        "extraction finished"
    );
    Ok(Extraction {
        format,
        root: destination.to_path_buf(),
        entry_count: tally.entries,
        total_bytes: tally.bytes,
        listing,
    })
}

fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

pub(crate) fn create_directory(base: &Path, relative: &Path, resolved: &Path) -> Result<()> {
    ensure_no_symlink_ancestors(base, relative)?;
    if std::fs::symlink_metadata(resolved).is_ok_and(|meta| meta.file_type().is_symlink()) {
        return Err(Error::SymlinkTraversal {
            entry: relative.to_path_buf(),
        });
    }
    create_dir_all(resolved)
}

/// Make room for a non-directory entry at `resolved`: its parents exist, none
/// of them is a symlink, and a file or link left by an earlier entry is gone.
pub(crate) fn prepare_slot(base: &Path, relative: &Path, resolved: &Path) -> Result<()> {
    ensure_no_symlink_ancestors(base, relative)?;
    if let Some(parent) = resolved.parent() {
        create_dir_all(parent)?;
    }
    match std::fs::symlink_metadata(resolved) {
        Ok(meta) if !meta.is_dir() => {
            std::fs::remove_file(resolved).map_err(|e| Error::ExtractionFailed {
                path: resolved.to_path_buf(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

/// Stream an entry's data into a new file. Read failures are archive problems
/// and go through `on_read`; write failures are local.
pub(crate) fn write_file<R: Read + ?Sized>(
    reader: &mut R,
    base: &Path,
    relative: &Path,
    resolved: &Path,
    on_read: &dyn Fn(io::Error) -> Error,
) -> Result<u64> {
    prepare_slot(base, relative, resolved)?;

    let write_failed = |e: io::Error| Error::ExtractionFailed {
        path: resolved.to_path_buf(),
        source: e,
    };
    let mut out = File::create(resolved).map_err(write_failed)?;
    let mut buf = [0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(on_read(e)),
        };
        out.write_all(&buf[..n]).map_err(write_failed)?;
        written += n as u64;
    }
    out.flush().map_err(write_failed)?;
    Ok(written)
}
