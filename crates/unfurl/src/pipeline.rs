use std::path::{Path, PathBuf};

use unfurl_archive::{extract_tar, extract_zip};
use unfurl_fetch::{FetchOptions, HttpClient, Progress, ReqwestClient, retrieve};

use crate::classify::{ArchiveKind, ZIP_CONTENT_TYPE, classify};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{DownloadError, Result};
use crate::layout::{LayoutOptions, normalize_layout};

/// Subdirectory of the scratch directory the archive is unpacked into.
pub const EXTRACT_DIR: &str = "extract_dir";
/// Subdirectory of the scratch directory holding the normalized result.
pub const TARGET_DIR: &str = "extracted";

const SCRATCH_PREFIX: &str = "unfurl-";

/// Downloads archives and unpacks them into a fresh scratch directory.
///
/// Every call creates its own scratch directory and leaves it in place, the
/// returned path lives inside it. Removing it is up to the caller.
///
/// # Examples
///
/// ```no_run
/// use unfurl::{Downloader, NullSink, ReqwestClient};
///
/// let client = ReqwestClient::new()?;
/// let downloader = Downloader::new(client).diagnostics(NullSink);
/// let extracted = downloader.download_and_extract("https://example.com/data.tar.gz", None)?;
/// println!("{}", extracted.display());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Downloader<C> {
    client: C,
    options: FetchOptions,
    diagnostics: Box<dyn DiagnosticSink>,
    layout: LayoutOptions,
    scratch_root: Option<PathBuf>,
}

impl<C: HttpClient> Downloader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            options: FetchOptions::default(),
            diagnostics: Box::new(TracingSink),
            layout: LayoutOptions::default(),
            scratch_root: None,
        }
    }

    #[must_use]
    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Box::new(sink);
        self
    }

    #[must_use]
    pub fn layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Create scratch directories below `root` instead of the system
    /// temporary directory.
    #[must_use]
    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch the archive at `source`, unpack it and return the normalized
    /// directory (or file, for a lone-file archive).
    pub fn download_and_extract(
        &self,
        source: &str,
        progress: Option<&mut dyn FnMut(&Progress)>,
    ) -> Result<PathBuf> {
        self.diagnostics
            .emit(&format!("download_and_extract(source={source})"), 3);
        let kind = classify(source)?;

        let scratch = self.create_scratch()?;
        self.diagnostics
            .emit(&format!("Tmpdir: {}", scratch.display()), 1);

        let archive_path = scratch.join(kind.file_name());
        let retrieved = retrieve(&self.client, source, &archive_path, &self.options, progress)
            .map_err(|e| DownloadError::fetch(source, e))?;

        let extract_dir = scratch.join(EXTRACT_DIR);
        let target = scratch.join(TARGET_DIR);
        let extraction = match &kind {
            ArchiveKind::Zip => {
                if retrieved.content_type.as_deref() != Some(ZIP_CONTENT_TYPE) {
                    return Err(DownloadError::not_a_zip(
                        source,
                        &retrieved.path,
                        retrieved.content_type.as_deref(),
                    ));
                }
                self.announce("extract_zip", &retrieved.path, &target, &scratch);
                extract_zip(&retrieved.path, &extract_dir)
                    .map_err(|e| DownloadError::archive("ZIP file", e))?
            }
            ArchiveKind::Tar { .. } => {
                self.announce("extract_tar", &retrieved.path, &target, &scratch);
                extract_tar(&retrieved.path, &extract_dir)
                    .map_err(|e| DownloadError::archive("Archive file", e))?
            }
        };

        let layout = normalize_layout(&extract_dir, &target, &extraction.listing, self.layout)
            .map_err(|e| {
                DownloadError::filesystem(
                    format_args!("Could not place the contents of <{source}>"),
                    e,
                )
            })?;
        self.diagnostics.emit(
            &format!(
                "{} {} entries as {layout:?} into {}",
                extraction.format,
                extraction.entry_count,
                target.display()
            ),
            2,
        );

        Ok(target)
    }

    fn announce(&self, step: &str, name: &Path, directory: &Path, tmpdir: &Path) {
        self.diagnostics.emit(
            &format!(
                "{step}(name={}, directory={}, tmpdir={})",
                name.display(),
                directory.display(),
                tmpdir.display()
            ),
            3,
        );
    }

    fn create_scratch(&self) -> Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| DownloadError::filesystem("Could not create a scratch directory", e))?;
        Ok(dir.keep())
    }
}

/// Download and unpack `source` with a default [`ReqwestClient`] and
/// diagnostics sent to `tracing`.
pub fn download_and_extract(
    source: &str,
    progress: Option<&mut dyn FnMut(&Progress)>,
) -> Result<PathBuf> {
    let client = ReqwestClient::new().map_err(|e| DownloadError::fetch(source, e))?;
    Downloader::new(client).download_and_extract(source, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, NullSink};
    use std::io::{Cursor, Write};
    use unfurl_fetch::{FetchError, Response};

    enum Reply {
        Body {
            content_type: &'static str,
            bytes: Vec<u8>,
        },
        Status(u16),
        Truncated {
            declared: u64,
            bytes: Vec<u8>,
        },
        Unreachable,
    }

    struct MockClient {
        reply: Reply,
    }

    impl HttpClient for MockClient {
        fn get(&self, url: &str, _headers: &[(String, String)]) -> unfurl_fetch::Result<Response> {
            match &self.reply {
                Reply::Body {
                    content_type,
                    bytes,
                } => Ok(Response {
                    status: 200,
                    content_type: Some(content_type.to_string()),
                    content_length: Some(bytes.len() as u64),
                    body: Box::new(Cursor::new(bytes.clone())),
                }),
                Reply::Status(status) => Ok(Response {
                    status: *status,
                    content_type: Some("text/html".to_string()),
                    content_length: Some(0),
                    body: Box::new(std::io::empty()),
                }),
                Reply::Truncated { declared, bytes } => Ok(Response {
                    status: 200,
                    content_type: Some("application/gzip".to_string()),
                    content_length: Some(*declared),
                    body: Box::new(Cursor::new(bytes.clone())),
                }),
                Reply::Unreachable => Err(FetchError::Unreachable {
                    url: url.to_string(),
                    reason: "dns error".to_string(),
                }),
            }
        }
    }

    fn downloader(reply: Reply, root: &Path) -> Downloader<MockClient> {
        Downloader::new(MockClient { reply })
            .diagnostics(NullSink)
            .scratch_root(root)
    }

    fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, *data).unwrap();
        }
        let raw = builder.into_inner().unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw).unwrap();
        encoder.finish().unwrap()
    }

    fn only_scratch(root: &Path) -> PathBuf {
        let mut entries: Vec<_> = std::fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1, "{entries:?}");
        entries.remove(0)
    }

    #[test]
    fn tar_gz_with_wrapper_is_unwrapped() {
        let root = tempfile::tempdir().unwrap();
        let bytes = tar_gz(&[("pkg-1.0/a", b"a"), ("pkg-1.0/b", b"b")]);
        let downloader = downloader(
            Reply::Body {
                content_type: "application/gzip",
                bytes,
            },
            root.path(),
        );

        let target = downloader
            .download_and_extract("http://host/pkg-1.0.tar.gz", None)
            .unwrap();

        assert!(target.ends_with(TARGET_DIR));
        assert_eq!(std::fs::read_to_string(target.join("a")).unwrap(), "a");
        assert_eq!(std::fs::read_to_string(target.join("b")).unwrap(), "b");
        let scratch = only_scratch(root.path());
        assert!(
            scratch
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(SCRATCH_PREFIX)
        );
        assert!(scratch.join("archive.0.tar.gz").is_file());
    }

    #[test]
    fn flat_zip_is_copied() {
        let root = tempfile::tempdir().unwrap();
        let bytes = zip_archive(&[("a.txt", b"first"), ("b.txt", b"second")]);
        let downloader = downloader(
            Reply::Body {
                content_type: ZIP_CONTENT_TYPE,
                bytes,
            },
            root.path(),
        );

        let mut seen = Vec::new();
        let mut record = |p: &Progress| seen.push(p.bytes_so_far);
        let target = downloader
            .download_and_extract("http://host/data.zip", Some(&mut record))
            .unwrap();

        assert_eq!(std::fs::read_to_string(target.join("a.txt")).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(target.join("b.txt")).unwrap(), "second");
        assert_eq!(seen.first(), Some(&0));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn zip_served_as_html_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let downloader = downloader(
            Reply::Body {
                content_type: "text/html",
                bytes: b"<html>login required</html>".to_vec(),
            },
            root.path(),
        );

        let err = downloader
            .download_and_extract("http://host/data.zip", None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ContentTypeMismatch);
        let scratch = only_scratch(root.path());
        assert!(scratch.join("archive.zip").is_file());
        assert!(!scratch.join(EXTRACT_DIR).exists());
        assert!(!scratch.join(TARGET_DIR).exists());
    }

    #[test]
    fn unknown_format_fails_before_any_io() {
        let root = tempfile::tempdir().unwrap();
        let downloader = downloader(Reply::Unreachable, root.path());

        let err = downloader
            .download_and_extract("http://host/data.rar", None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownFormat);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn http_status_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let downloader = downloader(Reply::Status(404), root.path());

        let err = downloader
            .download_and_extract("http://host/data.tar.gz", None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::HttpStatus(404));
        assert!(err.to_string().contains("http://host/data.tar.gz"));
        assert!(!only_scratch(root.path()).join(TARGET_DIR).exists());
    }

    #[test]
    fn unreachable_host() {
        let root = tempfile::tempdir().unwrap();
        let downloader = downloader(Reply::Unreachable, root.path());

        let err = downloader
            .download_and_extract("http://host/data.tar.gz", None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkUnreachable);
    }

    #[test]
    fn truncated_tar_is_incomplete() {
        let root = tempfile::tempdir().unwrap();
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(4096);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, "big.bin", &[1u8; 4096][..])
            .unwrap();
        let raw = builder.into_inner().unwrap();
        let downloader = downloader(
            Reply::Body {
                content_type: "application/x-tar",
                bytes: raw[..512 + 1000].to_vec(),
            },
            root.path(),
        );

        let err = downloader
            .download_and_extract("http://host/data.tar", None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ArchiveIncomplete);
        assert!(!only_scratch(root.path()).join(TARGET_DIR).exists());
    }

    #[test]
    fn garbage_tar_is_unreadable() {
        let root = tempfile::tempdir().unwrap();
        let downloader = downloader(
            Reply::Body {
                content_type: "application/gzip",
                bytes: "not a tarball at all. ".repeat(64).into_bytes(),
            },
            root.path(),
        );

        let err = downloader
            .download_and_extract("http://host/data.tar", None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArchiveUnreadable);
    }

    #[test]
    fn empty_body_is_unreadable() {
        let root = tempfile::tempdir().unwrap();
        let downloader = downloader(
            Reply::Body {
                content_type: "application/gzip",
                bytes: Vec::new(),
            },
            root.path(),
        );

        let err = downloader
            .download_and_extract("http://host/data.tar.gz", None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ArchiveUnreadable);
        assert!(err.message().starts_with("Archive file is unreadable"));
        assert!(!only_scratch(root.path()).join(TARGET_DIR).exists());
    }

    #[test]
    fn short_error_page_is_unreadable() {
        let root = tempfile::tempdir().unwrap();
        let downloader = downloader(
            Reply::Body {
                content_type: "text/html",
                bytes: b"<html><body>404 Not Found</body></html>".to_vec(),
            },
            root.path(),
        );

        let err = downloader
            .download_and_extract("http://host/data.tar.gz", None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ArchiveUnreadable);
        assert!(!only_scratch(root.path()).join(TARGET_DIR).exists());
    }

    #[test]
    fn body_shorter_than_declared_is_a_network_failure() {
        let root = tempfile::tempdir().unwrap();
        let downloader = downloader(
            Reply::Truncated {
                declared: 4096,
                bytes: vec![0x1f; 100],
            },
            root.path(),
        );

        let err = downloader
            .download_and_extract("http://host/data.tar.gz", None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkUnreachable);
        let scratch = only_scratch(root.path());
        assert!(!scratch.join("archive.tar.gz").exists());
        assert!(!scratch.join(EXTRACT_DIR).exists());
    }

    #[test]
    fn diagnostics_reach_the_sink() {
        use std::sync::{Arc, Mutex};

        let root = tempfile::tempdir().unwrap();
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let messages = Arc::clone(&messages);
            move |message: &str, level: u8| {
                messages.lock().unwrap().push((message.to_string(), level))
            }
        };
        let downloader = Downloader::new(MockClient {
            reply: Reply::Body {
                content_type: "application/gzip",
                bytes: tar_gz(&[("one.txt", b"1")]),
            },
        })
        .diagnostics(sink)
        .scratch_root(root.path());

        downloader
            .download_and_extract("http://host/one.tar.gz", None)
            .unwrap();

        let messages = messages.lock().unwrap();
        assert!(messages.iter().any(|(m, level)| m.starts_with("Tmpdir: ") && *level == 1));
        assert!(messages.iter().any(|(m, _)| m.starts_with("extract_tar(")));
    }
}
