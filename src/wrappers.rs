//! Compiler wrapper-script generation.
//!
//! The Clang in a standalone toolchain is meant to be a drop-in replacement
//! for GCC, since most projects using one are not set up for cross compiling
//! (and those that are expect the GCC style). The driver therefore has to
//! already know what target it is building for: each generated wrapper pins
//! `-target` and `--sysroot` and forwards everything else to a versioned
//! copy of the real binary sitting next to it.

use crate::fsutil;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// First argument that means the caller has already fully specified the
/// target, so the wrapper must not inject anything.
pub const PASSTHROUGH_FLAG: &str = "-cc1";

/// One wrapper described as data: which versioned binary it dispatches to
/// and which flags it injects on the non-pass-through branch. Rendering to
/// shell or batch text is separate so the flag logic is testable on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperSpec {
    /// Versioned driver name, e.g. `clang50` or `clang50++`.
    pub binary: String,
    /// Flags injected ahead of the caller's arguments.
    pub flags: Vec<String>,
}

impl WrapperSpec {
    /// Compose the spec for one compiler driver (`plusplus` selects C++).
    ///
    /// The arm triple always targets ARMv7, never the armv5 baseline the
    /// backend nominally supports. 32-bit x86 below API 24 additionally
    /// needs `-mstackrealign`; from 24 on the platform guarantees 16-byte
    /// stack alignment and the flag would waste a register.
    pub fn new(triple: &str, api: u32, version: &str, plusplus: bool) -> Result<Self> {
        let mut parts = triple.splitn(3, '-');
        let (Some(arch), Some(os), Some(env)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("Malformed triple: {triple}");
        };
        let arch = if arch == "arm" { "armv7a" } else { arch };

        let target = format!("{arch}-none-{os}-{env}{api}");
        let mut flags = vec!["-target".to_string(), target];
        if arch == "i686" && api < 24 {
            flags.push("-mstackrealign".to_string());
        }

        let suffix = if plusplus { "++" } else { "" };
        Ok(Self {
            binary: format!("clang{version}{suffix}"),
            flags,
        })
    }

    /// Render the Unix shell wrapper.
    pub fn render_sh(&self) -> String {
        format!(
            "#!/bin/bash\n\
             if [ \"$1\" != \"{pass}\" ]; then\n\
            \x20   `dirname $0`/{bin} {flags} --sysroot `dirname $0`/../sysroot \"$@\"\n\
             else\n\
            \x20   # target/triple already spelled out.\n\
            \x20   `dirname $0`/{bin} \"$@\"\n\
             fi\n",
            pass = PASSTHROUGH_FLAG,
            bin = self.binary,
            flags = self.flags.join(" "),
        )
    }

    /// Render the Windows batch wrapper.
    pub fn render_cmd(&self) -> String {
        let exe = format!("{}.exe", self.binary);
        format!(
            "@echo off\n\
             setlocal\n\
             call :find_bin\n\
             if \"%1\" == \"{pass}\" goto :L\n\
             \n\
             set \"_BIN_DIR=\" && %_BIN_DIR%{exe} {flags} --sysroot %_BIN_DIR%..\\sysroot %*\n\
             if ERRORLEVEL 1 exit /b 1\n\
             goto :done\n\
             \n\
             :L\n\
             rem target/triple already spelled out.\n\
             set \"_BIN_DIR=\" && %_BIN_DIR%{exe} %*\n\
             if ERRORLEVEL 1 exit /b 1\n\
             goto :done\n\
             \n\
             :find_bin\n\
             rem Accommodate a quoted arg0, e.g.: \"clang\"\n\
             set _BIN_DIR=%~dp0\n\
             exit /b\n\
             \n\
             :done\n",
            pass = PASSTHROUGH_FLAG,
            flags = self.flags.join(" "),
        )
    }
}

/// Numeric version suffix appended to the renamed compiler binaries,
/// computed from the version-identifier file at the installation root.
pub fn read_version_suffix(install_dir: &Path) -> Result<String> {
    let path = install_dir.join("AndroidVersion.txt");
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_version_suffix(text.trim())
}

fn parse_version_suffix(version: &str) -> Result<String> {
    let parts: Vec<&str> = version.split('.').collect();
    let &[major, minor, _build] = parts.as_slice() else {
        bail!("Malformed version: {version}");
    };
    Ok(format!("{major}{minor}"))
}

/// Generate the wrapper scripts in `install_dir/bin`.
///
/// The real `clang`/`clang++` binaries are renamed with the version suffix
/// first so the wrappers can take over the well-known names. Both bare and
/// triple-prefixed wrapper names are produced; Windows hosts additionally
/// get `.cmd` variants of each.
pub fn generate(install_dir: &Path, triple: &str, api: u32, windows: bool) -> Result<()> {
    let version = read_version_suffix(install_dir)?;
    let exe = if windows { ".exe" } else { "" };
    let bin_dir = install_dir.join("bin");

    fs::rename(
        bin_dir.join(format!("clang{exe}")),
        bin_dir.join(format!("clang{version}{exe}")),
    )
    .context("Failed to rename clang")?;
    fs::rename(
        bin_dir.join(format!("clang++{exe}")),
        bin_dir.join(format!("clang{version}++{exe}")),
    )
    .context("Failed to rename clang++")?;

    for plusplus in [false, true] {
        let spec = WrapperSpec::new(triple, api, &version, plusplus)?;
        let name = if plusplus { "clang++" } else { "clang" };

        let wrapper = bin_dir.join(name);
        fs::write(&wrapper, spec.render_sh())
            .with_context(|| format!("Failed to write {}", wrapper.display()))?;
        make_executable(&wrapper)?;
        fsutil::copy_file(&wrapper, &bin_dir.join(format!("{triple}-{name}")))?;

        if windows {
            let text = spec.render_cmd();
            for prefix in ["".to_string(), format!("{triple}-")] {
                let bat = bin_dir.join(format!("{prefix}{name}.cmd"));
                fs::write(&bat, &text)
                    .with_context(|| format!("Failed to write {}", bat.display()))?;
            }
        }
    }

    Ok(())
}

/// Overwrite the legacy compiler-suite entry points with the new wrappers so
/// builds expecting `<triple>-gcc`/`<triple>-g++` keep working.
pub fn install_gcc_aliases(install_dir: &Path, triple: &str, windows: bool) -> Result<()> {
    let cmd = if windows { ".cmd" } else { "" };
    let bin_dir = install_dir.join("bin");

    fsutil::copy_file(
        &bin_dir.join(format!("clang{cmd}")),
        &bin_dir.join(format!("{triple}-gcc{cmd}")),
    )?;
    fsutil::copy_file(
        &bin_dir.join(format!("clang++{cmd}")),
        &bin_dir.join(format!("{triple}-g++{cmd}")),
    )?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to chmod {}", path.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_targets_armv7() {
        let spec = WrapperSpec::new("arm-linux-androideabi", 21, "50", false).unwrap();
        assert_eq!(
            spec.flags,
            ["-target", "armv7a-none-linux-androideabi21"]
        );
    }

    #[test]
    fn test_arm_targets_armv7_at_every_api() {
        for api in [16, 19, 24, 28] {
            let spec = WrapperSpec::new("arm-linux-androideabi", api, "50", false).unwrap();
            assert!(spec.flags[1].starts_with("armv7a-"));
        }
    }

    #[test]
    fn test_x86_below_24_realigns_stack() {
        let spec = WrapperSpec::new("i686-linux-android", 19, "50", false).unwrap();
        assert_eq!(
            spec.flags,
            ["-target", "i686-none-linux-android19", "-mstackrealign"]
        );
    }

    #[test]
    fn test_x86_at_24_does_not_realign_stack() {
        let spec = WrapperSpec::new("i686-linux-android", 24, "50", false).unwrap();
        assert_eq!(spec.flags, ["-target", "i686-none-linux-android24"]);
    }

    #[test]
    fn test_api_is_appended_without_separator() {
        let spec = WrapperSpec::new("aarch64-linux-android", 21, "50", false).unwrap();
        assert_eq!(spec.flags[1], "aarch64-none-linux-android21");
    }

    #[test]
    fn test_plusplus_selects_cxx_driver() {
        let spec = WrapperSpec::new("aarch64-linux-android", 21, "50", true).unwrap();
        assert_eq!(spec.binary, "clang50++");
    }

    #[test]
    fn test_malformed_triple_is_rejected() {
        assert!(WrapperSpec::new("aarch64", 21, "50", false).is_err());
    }

    #[test]
    fn test_version_suffix_concatenates_major_minor() {
        assert_eq!(parse_version_suffix("5.0.300080").unwrap(), "50");
        assert_eq!(parse_version_suffix("4.9.1").unwrap(), "49");
    }

    #[test]
    fn test_version_suffix_rejects_malformed() {
        assert!(parse_version_suffix("5.0").is_err());
        assert!(parse_version_suffix("5.0.1.2").is_err());
    }

    #[test]
    fn test_sh_passthrough_branch_has_no_flags() {
        let spec = WrapperSpec::new("i686-linux-android", 19, "50", false).unwrap();
        let script = spec.render_sh();

        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], "#!/bin/bash");
        assert!(lines[1].contains("if [ \"$1\" != \"-cc1\" ]"));
        // Inject branch carries target, realign, and sysroot flags.
        assert!(lines[2].contains("-target i686-none-linux-android19"));
        assert!(lines[2].contains("-mstackrealign"));
        assert!(lines[2].contains("--sysroot `dirname $0`/../sysroot"));
        // Pass-through branch forwards untouched.
        assert_eq!(lines[5].trim(), "`dirname $0`/clang50 \"$@\"");
    }

    #[test]
    fn test_cmd_renders_both_branches() {
        let spec = WrapperSpec::new("aarch64-linux-android", 21, "50", true).unwrap();
        let script = spec.render_cmd();
        assert!(script.contains("if \"%1\" == \"-cc1\" goto :L"));
        assert!(script.contains("%_BIN_DIR%clang50++.exe -target aarch64-none-linux-android21 --sysroot %_BIN_DIR%..\\sysroot %*"));
        assert!(script.contains("%_BIN_DIR%clang50++.exe %*"));
        assert!(script.contains("set _BIN_DIR=%~dp0"));
    }
}
