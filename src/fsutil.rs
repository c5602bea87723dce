//! Filesystem helpers for merging prebuilt directory trees.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Merge the contents of `src` into `dst`, like `cp -r` onto an existing tree.
///
/// Directories are created as needed (empty ones included), symlinks are
/// recreated with the same target string rather than dereferenced, and
/// regular files overwrite any destination file of the same name, keeping
/// the source modification time.
pub fn merge_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry =
            entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("Walked outside of {}", src.display()))?;
        if rel.as_os_str().is_empty() {
            fs::create_dir_all(dst)
                .with_context(|| format!("Failed to create {}", dst.display()))?;
            continue;
        }

        let target = dst.join(rel);
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            replace_symlink(entry.path(), &target)?;
        } else if file_type.is_dir() {
            debug!("Making directory {}", target.display());
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copy one file, overwriting `dst` and preserving the source mtime.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    debug!("Copying {}", src.display());
    fs::copy(src, dst).with_context(|| {
        format!("Failed to copy {} to {}", src.display(), dst.display())
    })?;

    let mtime = fs::metadata(src)?.modified()?;
    let copied = fs::OpenOptions::new().write(true).open(dst)?;
    copied.set_modified(mtime)?;
    Ok(())
}

/// Recreate the symlink at `src` as `dst`, replacing any existing entry.
/// Dangling links are recreated dangling, never resolved.
fn replace_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link_target = fs::read_link(src)
        .with_context(|| format!("Failed to read link {}", src.display()))?;

    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst)
            .with_context(|| format!("Failed to replace {}", dst.display()))?;
    }

    debug!("Symlinking {} to {}", dst.display(), link_target.display());
    make_symlink(&link_target, dst)
        .with_context(|| format!("Failed to symlink {}", dst.display()))?;
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    // Windows needs the link flavor up front; dangling links default to file
    // links, which is all the NDK trees contain.
    let resolved = link
        .parent()
        .map(|parent| parent.join(target))
        .and_then(|path| fs::metadata(path).ok());
    match resolved {
        Some(meta) if meta.is_dir() => std::os::windows::fs::symlink_dir(target, link),
        _ => std::os::windows::fs::symlink_file(target, link),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_merge_creates_empty_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("usr/include/empty")).unwrap();

        merge_tree(&src, &dst).unwrap();
        assert!(dst.join("usr/include/empty").is_dir());
    }

    #[test]
    fn test_merge_into_existing_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("bin")).unwrap();
        fs::create_dir_all(dst.join("lib")).unwrap();
        fs::write(src.join("bin/new"), "new").unwrap();
        fs::write(dst.join("lib/old"), "old").unwrap();

        merge_tree(&src, &dst).unwrap();
        assert_eq!(read(&dst.join("bin/new")), "new");
        assert_eq!(read(&dst.join("lib/old")), "old");
    }

    #[test]
    fn test_merge_overwrites_conflicting_files() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("file"), "second").unwrap();
        fs::write(dst.join("file"), "first").unwrap();

        merge_tree(&src, &dst).unwrap();
        assert_eq!(read(&dst.join("file")), "second");
    }

    #[test]
    fn test_merge_twice_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::write(src.join("a/b/file"), "content").unwrap();

        merge_tree(&src, &dst).unwrap();
        merge_tree(&src, &dst).unwrap();

        assert_eq!(read(&dst.join("a/b/file")), "content");
        let entries: Vec<_> = fs::read_dir(dst.join("a/b")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::write(&src, "content").unwrap();

        copy_file(&src, &dst).unwrap();
        let src_mtime = fs::metadata(&src).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);
    }

    #[cfg(unix)]
    #[test]
    fn test_merge_recreates_symlinks_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("libfoo.so.1"), "elf").unwrap();
        std::os::unix::fs::symlink("libfoo.so.1", src.join("libfoo.so")).unwrap();

        merge_tree(&src, &dst).unwrap();
        let link = fs::read_link(dst.join("libfoo.so")).unwrap();
        assert_eq!(link, Path::new("libfoo.so.1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_merge_keeps_dangling_symlinks_dangling() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        std::os::unix::fs::symlink("does-not-exist", src.join("broken")).unwrap();

        merge_tree(&src, &dst).unwrap();
        merge_tree(&src, &dst).unwrap(); // replacing an existing link also works

        let link = fs::read_link(dst.join("broken")).unwrap();
        assert_eq!(link, Path::new("does-not-exist"));
        assert!(!dst.join("broken").exists()); // still dangling
    }
}
