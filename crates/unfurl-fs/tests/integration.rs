use unfurl_fs::{
    Error, FallbackStrategy, HardlinkOrCopyOptions, Workspace, copy_dir_all, copy_file,
    hardlink_or_copy,
};
use tempfile::tempdir;

#[test]
fn test_copy_file_overwrites() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("source.txt");
    let dest = dir.path().join("dest.txt");

    std::fs::write(&src, "fresh").unwrap();
    std::fs::write(&dest, "stale").unwrap();

    copy_file(&src, &dest).unwrap();
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "fresh");
}

#[test]
fn test_copy_dir_all_into_staged_workspace() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("payload");
    std::fs::create_dir_all(src.join("bin")).unwrap();
    std::fs::write(src.join("bin/tool"), "#!/bin/sh").unwrap();
    std::fs::write(src.join("README"), "readme").unwrap();

    let dest = dir.path().join("out");
    let workspace = Workspace::beside(&dest).unwrap();
    copy_dir_all(&src, workspace.path()).unwrap();
    assert!(!dest.exists());

    workspace.commit().unwrap();
    assert!(dest.join("bin/tool").exists());
    assert!(dest.join("README").exists());
}

#[test]
fn test_workspace_refuses_existing_destination() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out");
    std::fs::create_dir_all(&dest).unwrap();

    let workspace = Workspace::beside(&dest).unwrap();
    std::fs::create_dir_all(workspace.path()).unwrap();
    let staged = workspace.path().to_path_buf();

    let result = workspace.commit();
    assert!(matches!(result, Err(Error::AlreadyExists { .. })));
    // the failed commit drops the workspace, which removes the staged tree
    assert!(!staged.exists());
}

#[test]
fn test_hardlink_or_copy_fallback_copy() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("source.txt");
    let dest = dir.path().join("copy.txt");

    std::fs::write(&src, "content to copy").unwrap();

    let options = HardlinkOrCopyOptions::new().fallback(FallbackStrategy::Copy);
    hardlink_or_copy(&src, &dest, options).unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"content to copy");
}

#[cfg(unix)]
#[test]
fn test_hardlink_shares_inode() {
    use std::os::unix::fs::MetadataExt;

    let dir = tempdir().unwrap();
    let src = dir.path().join("source.txt");
    let dest = dir.path().join("hardlink.txt");

    std::fs::write(&src, "shared content").unwrap();
    hardlink_or_copy(&src, &dest, HardlinkOrCopyOptions::new()).unwrap();

    let src_meta = std::fs::metadata(&src).unwrap();
    let dest_meta = std::fs::metadata(&dest).unwrap();
    assert_eq!(src_meta.ino(), dest_meta.ino());
}
