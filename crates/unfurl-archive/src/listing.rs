use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;

/// Top-level names found in an extraction directory, sorted so that every
/// consumer walks them in the same order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractionListing {
    names: Vec<OsString>,
}

impl ExtractionListing {
    pub fn read(dir: impl AsRef<Path>) -> io::Result<Self> {
        let mut names = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(Self { names })
    }

    pub fn names(&self) -> &[OsString] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &OsStr> {
        self.names.iter().map(OsString::as_os_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The only top-level entry, if there is exactly one.
    pub fn single(&self) -> Option<&OsStr> {
        match self.names.as_slice() {
            [only] => Some(only.as_os_str()),
            _ => None,
        }
    }
}

impl FromIterator<OsString> for ExtractionListing {
    fn from_iter<I: IntoIterator<Item = OsString>>(iter: I) -> Self {
        let mut names: Vec<_> = iter.into_iter().collect();
        names.sort();
        Self { names }
    }
}
