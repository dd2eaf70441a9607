use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use unfurl_fs::Workspace;

use crate::error::{FetchError, Result};
use crate::http::{HttpClient, Response, canonical_reason};
use crate::options::FetchOptions;
use crate::progress::Progress;

/// Read buffer size, and the granularity of progress reports.
pub const BLOCK_SIZE: usize = 8192;

/// A response body saved to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Retrieved {
    pub path: PathBuf,
    pub content_type: Option<String>,
    pub bytes: u64,
}

/// Fetch `url` into `destination`, which must not exist yet.
///
/// Any 2xx status is accepted. The body is staged next to `destination` and
/// only renamed into place once fully received, so a failed transfer leaves
/// nothing behind. `progress` is called once with zero bytes before the first
/// block and again after every block.
pub fn retrieve<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    destination: &Path,
    options: &FetchOptions,
    progress: Option<&mut dyn FnMut(&Progress)>,
) -> Result<Retrieved> {
    tracing::debug!(url, destination = %destination.display(), "retrieving");
    let response = client.get(url, &options.headers)?;
    if !response.is_success() {
        return Err(status_error(url, response.status));
    }
    save_body(url, response, destination, progress)
}

/// Fetch a single non-archive resource, requiring status 200 and a content
/// type that contains `expected_format` (for example `application/xml`).
pub fn download_file<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    expected_format: &str,
    destination: &Path,
    options: &FetchOptions,
) -> Result<Retrieved> {
    tracing::debug!(url, expected_format, "downloading file");
    let response = client.get(url, &options.headers)?;
    if response.status != 200 {
        return Err(status_error(url, response.status));
    }

    let actual = response.content_type.clone().unwrap_or_default();
    if !actual.contains(expected_format) {
        return Err(FetchError::UnexpectedContentType {
            expected: expected_format.to_string(),
            actual,
        });
    }

    save_body(url, response, destination, None)
}

fn status_error(url: &str, status: u16) -> FetchError {
    let reason = canonical_reason(status);
    tracing::debug!(url, status, %reason, "server refused request");
    FetchError::HttpStatus {
        url: url.to_string(),
        status,
        reason,
    }
}

fn save_body(
    url: &str,
    response: Response,
    destination: &Path,
    mut progress: Option<&mut dyn FnMut(&Progress)>,
) -> Result<Retrieved> {
    let Response {
        content_type,
        content_length,
        mut body,
        ..
    } = response;

    let mut report = |bytes_so_far: u64| {
        if let Some(callback) = progress.as_mut() {
            callback(&Progress {
                bytes_so_far,
                block_size: BLOCK_SIZE,
                total_size: content_length,
            });
        }
    };

    let workspace = Workspace::beside(destination)?;
    let write_failed = |e: io::Error| FetchError::Write {
        path: workspace.path().to_path_buf(),
        source: e,
    };
    let mut file = File::create(workspace.path()).map_err(write_failed)?;

    report(0);
    let mut buf = vec![0u8; BLOCK_SIZE];
    let mut received = 0u64;
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(match content_length {
                    Some(expected) if received < expected => {
                        tracing::debug!(url, error = %e, "body ended early");
                        FetchError::Incomplete { expected, received }
                    }
                    _ => FetchError::Unreachable {
                        url: url.to_string(),
                        reason: e.to_string(),
                    },
                });
            }
        };
        file.write_all(&buf[..n]).map_err(write_failed)?;
        received += n as u64;
        report(received);
    }

    if let Some(expected) = content_length {
        if received < expected {
            return Err(FetchError::Incomplete { expected, received });
        }
    }

    file.flush().map_err(write_failed)?;
    drop(file);
    let path = workspace.commit()?;
    tracing::debug!(url, bytes = received, content_type = ?content_type, "retrieved");

    Ok(Retrieved {
        path,
        content_type,
        bytes: received,
    })
}
