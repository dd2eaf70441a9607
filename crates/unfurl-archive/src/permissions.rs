use std::path::Path;

#[cfg(unix)]
use crate::error::Error;
use crate::error::Result;

/// Reduce an archived file mode to something safe to recreate: permission
/// bits only, no group or other write, and always owner read/write. Group and
/// other lose execute when the owner has none.
pub fn sanitize_file_mode(mode: u32) -> u32 {
    let mut mode = (mode & 0o777 & !0o022) | 0o600;
    if mode & 0o100 == 0 {
        mode &= !0o011;
    }
    mode
}

/// Apply an archived mode to an extracted regular file.
pub(crate) fn apply_file_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(sanitize_file_mode(mode));
        std::fs::set_permissions(path, perms).map_err(|e| Error::ExtractionFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    // windows keeps whatever the new file was created with
    #[cfg(not(unix))]
    let _ = (path, mode);

    Ok(())
}
