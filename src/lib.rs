//! Assembles a standalone cross-compilation toolchain for an Android target.
//!
//! The output is a conventional self-contained toolchain directory — wrapper
//! scripts pinning target and sysroot, platform headers and libraries, and
//! the C++ runtime — intended for use with existing build systems such as
//! autotools.

pub mod arch;
pub mod assemble;
pub mod fsutil;
pub mod host;
pub mod ndk;
pub mod package;
pub mod wrappers;

use anyhow::{bail, Context, Result};
use arch::Arch;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Validate the requested API level against the architecture's floor, or
/// default to the floor (with a warning) when none was requested.
pub fn resolve_api(arch: Arch, requested: Option<u32>) -> Result<u32> {
    let min_api = arch.min_api();
    match requested {
        None => {
            warn!("Defaulting to target API {min_api} (minimum supported target for {arch})");
            Ok(min_api)
        }
        Some(api) if api < min_api => {
            bail!("{api} is less than minimum platform for {arch} ({min_api})")
        }
        Some(api) => Ok(api),
    }
}

/// Pick the installation directory.
///
/// An explicit directory must not already exist unless `force` removes it
/// first. Without one, the toolchain goes into a triple-named directory
/// inside a fresh temporary directory; the returned guard removes the whole
/// temporary tree when dropped, on every exit path.
pub fn resolve_install_dir(
    explicit: Option<&Path>,
    triple: &str,
    force: bool,
) -> Result<(PathBuf, Option<TempDir>)> {
    match explicit {
        Some(dir) => {
            if dir.exists() {
                if force {
                    info!("Cleaning installation directory {}", dir.display());
                    fs::remove_dir_all(dir)
                        .with_context(|| format!("Failed to remove {}", dir.display()))?;
                } else {
                    bail!("Installation directory already exists. Use --force.");
                }
            }
            Ok((dir.to_path_buf(), None))
        }
        None => {
            let tempdir =
                tempfile::tempdir().context("Failed to create temporary directory")?;
            let install = tempdir.path().join(triple);
            Ok((install, Some(tempdir)))
        }
    }
}
