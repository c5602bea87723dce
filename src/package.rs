//! Archive creation for packaged toolchains.

use crate::host::Host;
use anyhow::{bail, Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Archive the assembled toolchain into `package_dir`, named after the
/// install directory (the target triple). Windows hosts get a zip, everyone
/// else a bzip2 tarball. Returns the archive path.
pub fn package(install_dir: &Path, package_dir: &Path, host: Host) -> Result<PathBuf> {
    let parent = install_dir
        .parent()
        .context("Install directory has no parent")?;
    let base = install_dir
        .file_name()
        .context("Install directory has no name")?;

    fs::create_dir_all(package_dir)
        .with_context(|| format!("Failed to create {}", package_dir.display()))?;
    // Absolute so the archiver can run from the install parent.
    let package_dir = package_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", package_dir.display()))?;

    let basename = base.to_string_lossy();
    let archive = if host.is_windows() {
        let archive = package_dir.join(format!("{basename}.zip"));
        info!("Packaging {}", archive.display());
        let status = Command::new("zip")
            .arg("-qr")
            .arg(&archive)
            .arg(base)
            .current_dir(parent)
            .status()
            .context("Failed to run zip")?;
        if !status.success() {
            bail!("zip failed for {}", archive.display());
        }
        archive
    } else {
        let archive = package_dir.join(format!("{basename}.tar.bz2"));
        info!("Packaging {}", archive.display());
        let status = Command::new("tar")
            .arg("-cjf")
            .arg(&archive)
            .arg("-C")
            .arg(parent)
            .arg(base)
            .status()
            .context("Failed to run tar")?;
        if !status.success() {
            bail!("tar failed for {}", archive.display());
        }
        archive
    };

    Ok(archive)
}
