use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} compression is not supported by this build")]
    UnsupportedCompression(&'static str),

    #[error("archive is unreadable: {reason}")]
    Unreadable { reason: String },

    #[error("archive is incomplete: {reason}")]
    Incomplete { reason: String },

    #[error("entry '{entry}' has an absolute path")]
    AbsolutePath { entry: PathBuf },

    #[error("zip-slip attack detected: entry '{entry}' escapes the extraction directory")]
    ZipSlip { entry: PathBuf },

    #[error("entry '{entry}' passes through a symlink")]
    SymlinkTraversal { entry: PathBuf },

    #[error("symlink target is absolute path: '{target}' in '{symlink}'")]
    AbsoluteSymlinkTarget { target: PathBuf, symlink: PathBuf },

    #[error("symlink target escapes base directory: '{symlink}' -> '{target}'")]
    SymlinkEscape { target: PathBuf, symlink: PathBuf },

    #[error("hard link target escapes base directory: '{link}' -> '{target}'")]
    HardlinkEscape { target: PathBuf, link: PathBuf },

    #[error("entry '{entry}' is a {kind} and will not be extracted")]
    UnsafeEntry { entry: PathBuf, kind: &'static str },

    #[error("entry path is not valid: {entry}")]
    InvalidPath { entry: String },

    #[error("extraction directory '{path}' already exists")]
    DestinationExists { path: PathBuf },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Fs(#[from] unfurl_fs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// The archive stream ended before its own structure said it should.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete { .. })
    }

    /// An entry was refused because writing it would leave the extraction
    /// directory or create something other than files, directories and links.
    pub fn is_unsafe_entry(&self) -> bool {
        matches!(
            self,
            Self::AbsolutePath { .. }
                | Self::ZipSlip { .. }
                | Self::SymlinkTraversal { .. }
                | Self::AbsoluteSymlinkTarget { .. }
                | Self::SymlinkEscape { .. }
                | Self::HardlinkEscape { .. }
                | Self::UnsafeEntry { .. }
        )
    }

    /// The failure came from the local filesystem rather than from the
    /// archive's content.
    pub fn is_local_io(&self) -> bool {
        matches!(
            self,
            Self::DestinationExists { .. }
                | Self::ExtractionFailed { .. }
                | Self::DirectoryCreationFailed { .. }
                | Self::Fs(_)
                | Self::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
