//! NDK installation layout and path resolution.

use crate::arch::Arch;
use crate::host::Host;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Handle to an NDK installation root.
pub struct Ndk {
    root: PathBuf,
}

impl Ndk {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Locate the NDK from an explicit flag or the conventional environment
    /// variables.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        let root = match explicit {
            Some(path) => path,
            None => std::env::var_os("ANDROID_NDK_ROOT")
                .or_else(|| std::env::var_os("ANDROID_NDK_HOME"))
                .map(PathBuf::from)
                .context(
                    "NDK not found. Pass --ndk or set ANDROID_NDK_ROOT/ANDROID_NDK_HOME",
                )?,
        };
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Verify that the installation looks like an NDK before touching it.
    pub fn check(&self) -> Result<()> {
        for check in ["build/core", "prebuilt", "platforms", "toolchains"] {
            let path = self.root.join(check);
            if !path.exists() {
                bail!("Failed sanity check: missing {}", path.display());
            }
        }
        Ok(())
    }

    /// Platform sysroot for an architecture and API level.
    ///
    /// A missing platform directory is reported together with the platform
    /// directories that actually exist.
    pub fn sysroot(&self, arch: Arch, api: u32) -> Result<PathBuf> {
        let platforms_root = self.root.join("platforms");
        let platform = platforms_root.join(format!("android-{api}"));

        if !platform.exists() {
            let mut valid = Vec::new();
            for entry in std::fs::read_dir(&platforms_root)
                .with_context(|| format!("Failed to read {}", platforms_root.display()))?
            {
                valid.push(entry?.file_name().to_string_lossy().into_owned());
            }
            valid.sort();
            bail!(
                "Could not find {}. Valid platforms:\n{}",
                platform.display(),
                valid.join("\n")
            );
        }

        let sysroot = platform.join(format!("arch-{arch}"));
        if !sysroot.exists() {
            bail!("Could not find {}", sysroot.display());
        }
        Ok(sysroot)
    }

    /// Prebuilt GCC/binutils tree for an architecture and host.
    pub fn gcc_toolchain(&self, arch: Arch, host: Host) -> Result<PathBuf> {
        let path = self
            .root
            .join("toolchains")
            .join(format!("{}-4.9", arch.gcc_toolchain()))
            .join("prebuilt")
            .join(host.tag());
        if !path.exists() {
            bail!("Could not find GCC/binutils: {}", path.display());
        }
        Ok(path)
    }

    /// Prebuilt Clang tree for a host.
    pub fn clang_toolchain(&self, host: Host) -> Result<PathBuf> {
        let path = self.root.join("toolchains/llvm/prebuilt").join(host.tag());
        if !path.exists() {
            bail!("Could not find Clang: {}", path.display());
        }
        Ok(path)
    }
}
