//! Host platform identification.

use anyhow::{bail, Result};
use std::path::Path;

/// Host platform a toolchain is assembled on. Selects the prebuilt
/// directory tag and the wrapper-script flavors to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Linux,
    Darwin,
    Windows64,
    /// 32-bit Windows NDKs ship their prebuilts under plain `windows`.
    Windows,
}

impl Host {
    /// Tag used in NDK prebuilt directory names.
    pub fn tag(self) -> &'static str {
        match self {
            Host::Linux => "linux-x86_64",
            Host::Darwin => "darwin-x86_64",
            Host::Windows64 => "windows-x86_64",
            Host::Windows => "windows",
        }
    }

    /// Whether batch-file wrapper variants are needed.
    pub fn is_windows(self) -> bool {
        matches!(self, Host::Windows64 | Host::Windows)
    }
}

/// Identify the running host, or fail for platforms no NDK supports.
pub fn detect(ndk_root: &Path) -> Result<Host> {
    if cfg!(target_os = "linux") {
        Ok(Host::Linux)
    } else if cfg!(target_os = "macos") {
        Ok(Host::Darwin)
    } else if cfg!(target_os = "windows") {
        if ndk_root.join("prebuilt").join(Host::Windows64.tag()).exists() {
            Ok(Host::Windows64)
        } else {
            Ok(Host::Windows)
        }
    } else {
        bail!("Unsupported platform: {}", std::env::consts::OS);
    }
}
