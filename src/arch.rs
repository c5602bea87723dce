//! Target architecture lookup tables.
//!
//! Every mapping the rest of the tool needs (triple, binary ABIs, legacy
//! toolchain directory, minimum API level) hangs off a closed enum so that
//! adding or removing an architecture is a single compile-checked change.

use clap::ValueEnum;
use std::fmt;

/// A target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Arch {
    #[value(name = "arm")]
    Arm,
    #[value(name = "arm64")]
    Arm64,
    #[value(name = "x86")]
    X86,
    #[value(name = "x86_64")]
    X86_64,
}

impl Arch {
    /// Architecture name as it appears in NDK paths (`arch-arm`, `android-arm64`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
        }
    }

    /// Compiler target triple.
    pub fn triple(self) -> &'static str {
        match self {
            Arch::Arm => "arm-linux-androideabi",
            Arch::Arm64 => "aarch64-linux-android",
            Arch::X86 => "i686-linux-android",
            Arch::X86_64 => "x86_64-linux-android",
        }
    }

    /// Binary ABIs that get their own runtime-library install.
    pub fn abis(self) -> &'static [&'static str] {
        match self {
            Arch::Arm => &["armeabi-v7a"],
            Arch::Arm64 => &["arm64-v8a"],
            Arch::X86 => &["x86"],
            Arch::X86_64 => &["x86_64"],
        }
    }

    /// Directory name of the legacy GCC/binutils toolchain, without the
    /// trailing version suffix.
    pub fn gcc_toolchain(self) -> &'static str {
        match self {
            Arch::Arm => "arm-linux-androideabi",
            Arch::Arm64 => "aarch64-linux-android",
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
        }
    }

    /// Minimum supported platform API level. 64-bit targets did not exist
    /// before API 21.
    pub fn min_api(self) -> u32 {
        match self {
            Arch::Arm | Arch::X86 => 16,
            Arch::Arm64 | Arch::X86_64 => 21,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
