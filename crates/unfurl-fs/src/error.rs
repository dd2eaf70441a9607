use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to move '{from}' to '{to}': {source}")]
    Commit {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("'{path}' already exists")]
    AlreadyExists { path: PathBuf },

    #[error("'{path}' has no file name")]
    NoFileName { path: PathBuf },

    #[error("hard link across devices: '{path}'")]
    CrossDeviceHardlink { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
