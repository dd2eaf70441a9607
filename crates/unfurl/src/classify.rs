use std::fmt;

use crate::error::{DownloadError, Result};

/// URL suffixes, without the leading dot, handled by the tar extractor.
pub const TAR_EXTENSIONS: [&str; 7] = ["tar.gz", "gz", "bz2", "tar", "gzip", "targz", "xz"];

/// The only content type accepted for a zip download.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    /// `extension` joins every suffix of the URL's file name, e.g. `.tar.gz`.
    Tar { extension: String },
}

impl ArchiveKind {
    /// Name the downloaded archive gets inside the scratch directory.
    pub fn file_name(&self) -> String {
        match self {
            Self::Zip => "archive.zip".to_string(),
            Self::Tar { extension } => format!("archive{extension}"),
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::Tar { extension } => write!(f, "tar ({extension})"),
        }
    }
}

/// Path part of `source`. Strings that are not absolute URLs are treated as
/// a bare path with any query or fragment cut off.
pub(crate) fn url_path(source: &str) -> String {
    match url::Url::parse(source) {
        Ok(url) => url.path().to_string(),
        Err(_) => source
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Final path segment, ignoring trailing slashes.
fn file_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

/// Last suffix of a file name; a dot in first or last position does not count.
fn suffix(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(i) if i > 0 && i < name.len() - 1 => Some(&name[i..]),
        _ => None,
    }
}

/// Every suffix of a file name. Leading dots are skipped and a name ending in
/// a dot has none.
fn suffixes(name: &str) -> Vec<&str> {
    if name.ends_with('.') {
        return Vec::new();
    }
    let offset = name.len() - name.trim_start_matches('.').len();
    let dots: Vec<usize> = name[offset..]
        .match_indices('.')
        .map(|(i, _)| i + offset)
        .collect();
    dots.iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = dots.get(n + 1).copied().unwrap_or(name.len());
            &name[start..end]
        })
        .collect()
}

/// Decide from the URL alone how the archive behind `source` is unpacked.
pub fn classify(source: &str) -> Result<ArchiveKind> {
    let path = url_path(source);
    let name = file_name(&path);

    let kind = match suffix(name) {
        Some(".zip") => Some(ArchiveKind::Zip),
        Some(last) if TAR_EXTENSIONS.contains(&&last[1..]) => Some(ArchiveKind::Tar {
            extension: suffixes(name).concat(),
        }),
        _ => None,
    };

    match kind {
        Some(kind) => {
            tracing::debug!(source, %kind, "classified archive");
            Ok(kind)
        }
        None => Err(DownloadError::unknown_format(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn tar(extension: &str) -> ArchiveKind {
        ArchiveKind::Tar {
            extension: extension.to_string(),
        }
    }

    #[test]
    fn zip_suffix() {
        assert_eq!(classify("https://host/data/pkg.zip").unwrap(), ArchiveKind::Zip);
        assert_eq!(classify("https://host/pkg.v2.zip?token=abc").unwrap(), ArchiveKind::Zip);
    }

    #[test]
    fn tar_family() {
        assert_eq!(classify("http://host/path/archive.tar.gz").unwrap(), tar(".tar.gz"));
        assert_eq!(classify("http://host/a.tgz.gz").unwrap(), tar(".tgz.gz"));
        assert_eq!(classify("http://host/a.tar").unwrap(), tar(".tar"));
        assert_eq!(classify("http://host/a.tar.bz2").unwrap(), tar(".tar.bz2"));
        assert_eq!(classify("http://host/a.tar.xz").unwrap(), tar(".tar.xz"));
        assert_eq!(classify("http://host/a.gzip").unwrap(), tar(".gzip"));
        assert_eq!(classify("http://host/a.targz").unwrap(), tar(".targz"));
    }

    #[test]
    fn version_dots_are_part_of_extension() {
        assert_eq!(
            classify("https://host/releases/tool-1.2.3.tar.gz").unwrap(),
            tar(".2.3.tar.gz")
        );
    }

    #[test]
    fn query_and_fragment_ignored() {
        assert_eq!(
            classify("https://host/a.tar.gz?download=1#top").unwrap(),
            tar(".tar.gz")
        );
        assert_eq!(classify("relative/a.tar?x=y.zip").unwrap(), tar(".tar"));
    }

    #[test]
    fn unknown_formats() {
        for source in [
            "https://host/archive.7z",
            "https://host/archive.tgz",
            "https://host/archive",
            "https://host/archive.zip.",
            "https://host/.zip",
            "https://host/",
            "https://host/download?file=a.zip",
        ] {
            let err = classify(source).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownFormat, "{source}");
            assert!(err.to_string().contains(source));
        }
    }

    #[test]
    fn suffix_rules() {
        assert_eq!(suffix("a.tar.gz"), Some(".gz"));
        assert_eq!(suffix(".bashrc"), None);
        assert_eq!(suffix("a."), None);
        assert_eq!(suffixes("a.tar.gz"), vec![".tar", ".gz"]);
        assert_eq!(suffixes(".hidden.tar"), vec![".tar"]);
        assert_eq!(suffixes("a."), Vec::<&str>::new());
        assert_eq!(suffixes("plain"), Vec::<&str>::new());
    }

    #[test]
    fn archive_file_names() {
        assert_eq!(ArchiveKind::Zip.file_name(), "archive.zip");
        assert_eq!(tar(".tar.gz").file_name(), "archive.tar.gz");
    }
}
