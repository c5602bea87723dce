//! Toolchain assembly.
//!
//! Builds one complete, self-contained installation for an (architecture,
//! API level) pair: compiler binaries, wrapper scripts, sysroot headers and
//! libraries, host tools, gdbserver, and the libc++ runtime for every ABI
//! the architecture supports. Strictly sequential and fail-fast.

use crate::arch::Arch;
use crate::fsutil;
use crate::host::Host;
use crate::ndk::Ndk;
use crate::wrappers;
use anyhow::{bail, Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Create a standalone toolchain at `install`.
#[allow(clippy::too_many_arguments)]
pub fn create_toolchain(
    install: &Path,
    arch: Arch,
    api: u32,
    gcc_path: &Path,
    clang_path: &Path,
    platform_sysroot: &Path,
    ndk: &Ndk,
    host: Host,
) -> Result<()> {
    let triple = arch.triple();

    info!("Copying GCC/binutils from {}", gcc_path.display());
    fsutil::merge_tree(gcc_path, install)?;
    info!("Copying Clang from {}", clang_path.display());
    fsutil::merge_tree(clang_path, install)?;

    info!("Generating compiler wrappers");
    wrappers::generate(install, triple, api, host.is_windows())?;
    wrappers::install_gcc_aliases(install, triple, host.is_windows())?;

    install_sysroot_headers(install, ndk, triple)?;
    install_sysroot_libs(install, platform_sysroot, arch, triple, ndk)?;

    info!("Copying host tools");
    fsutil::merge_tree(&ndk.root().join("prebuilt").join(host.tag()), install)?;

    let gdbserver = ndk
        .root()
        .join("prebuilt")
        .join(format!("android-{arch}"))
        .join("gdbserver");
    fsutil::merge_tree(&gdbserver, &install.join("share/gdbserver"))?;

    install_cxx_stl(install, ndk, gcc_path, arch, api)?;

    Ok(())
}

fn install_sysroot_headers(install: &Path, ndk: &Ndk, triple: &str) -> Result<()> {
    info!("Copying sysroot headers");
    let headers = ndk.root().join("sysroot/usr/include");
    let install_headers = install.join("sysroot/usr/include");
    fsutil::merge_tree(&headers, &install_headers)?;
    // Architecture-specific headers overlay the general ones.
    fsutil::merge_tree(&headers.join(triple), &install_headers)?;
    Ok(())
}

fn install_sysroot_libs(
    install: &Path,
    platform_sysroot: &Path,
    arch: Arch,
    triple: &str,
    ndk: &Ndk,
) -> Result<()> {
    info!("Copying sysroot libraries");
    let install_sysroot = install.join("sysroot");

    // Either, both, or neither may exist depending on the architecture.
    for suffix in ["", "64"] {
        let lib_path = platform_sysroot.join(format!("usr/lib{suffix}"));
        if lib_path.exists() {
            fsutil::merge_tree(&lib_path, &install_sysroot.join(format!("usr/lib{suffix}")))?;
        }
    }

    // x86_64 is not a real multilib target; its static libraries live flat
    // in the 64-bit path.
    let static_libs = ndk.root().join("sysroot/usr/lib").join(triple);
    let libdir = if arch == Arch::X86_64 { "usr/lib64" } else { "usr/lib" };
    fsutil::merge_tree(&static_libs, &install_sysroot.join(libdir))?;
    Ok(())
}

fn install_cxx_stl(
    install: &Path,
    ndk: &Ndk,
    gcc_path: &Path,
    arch: Arch,
    api: u32,
) -> Result<()> {
    info!("Copying C++ runtime");
    let triple = arch.triple();
    let gcc_ver = runtime_version(gcc_path, triple)?;
    let cxx_headers = install.join("include/c++").join(&gcc_ver);

    let libcxx = ndk.root().join("sources/cxx-stl/llvm-libc++");
    let libcxxabi = ndk.root().join("sources/cxx-stl/llvm-libc++abi");
    fsutil::merge_tree(&libcxx.join("include"), &cxx_headers)?;

    if api < 21 {
        // Any libc header that the compatibility shim also provides must be
        // resolvable from a second builtin include root.
        fsutil::merge_tree(
            &ndk.root().join("sources/android/support/include"),
            &install.join("sysroot/usr/local/include"),
        )?;
    }

    fsutil::merge_tree(
        &libcxxabi.join("include"),
        &install.join("include/llvm-libc++abi/include"),
    )?;

    // Not discoverable through the libc++ headers on their own.
    for header in ["cxxabi.h", "__cxxabi_config.h"] {
        fsutil::copy_file(
            &libcxxabi.join("include").join(header),
            &cxx_headers.join(header),
        )?;
    }

    for abi in arch.abis() {
        let src_libdir = libcxx.join("libs").join(abi);
        let dst_libdir = abi_libdir(install, triple, abi);
        copy_libcxx_libs(&src_libdir, &dst_libdir, abi, api)?;
        if arch == Arch::Arm {
            copy_libcxx_libs(&src_libdir, &dst_libdir.join("thumb"), abi, api)?;
        }
    }

    // Some build systems probe for the per-triple header directory even when
    // no target-specific headers are installed.
    let cxx_target_headers = cxx_headers.join(triple);
    fs::create_dir_all(&cxx_target_headers)
        .with_context(|| format!("Failed to create {}", cxx_target_headers.display()))?;

    Ok(())
}

/// Runtime-library version, taken from the single per-triple directory under
/// the compiler's internal library path. Anything but exactly one directory
/// there is a defect in the source tree.
fn runtime_version(gcc_path: &Path, triple: &str) -> Result<String> {
    let lib_dir = gcc_path.join("lib/gcc").join(triple);
    let mut versions = Vec::new();
    for entry in fs::read_dir(&lib_dir)
        .with_context(|| format!("Failed to read {}", lib_dir.display()))?
    {
        versions.push(entry?.file_name().to_string_lossy().into_owned());
    }
    if versions.len() != 1 {
        bail!(
            "Expected exactly one runtime version under {}, found {}",
            lib_dir.display(),
            versions.len()
        );
    }
    Ok(versions.remove(0))
}

/// ABI-specific library directory inside the installation.
fn abi_libdir(install: &Path, triple: &str, abi: &str) -> PathBuf {
    let libdir_name = if abi == "x86_64" { "lib64" } else { "lib" };
    let mut libdir = install.join(triple).join(libdir_name);
    if abi.starts_with("armeabi-v7a") {
        libdir = libdir.join("armv7-a");
    }
    libdir
}

fn copy_libcxx_libs(src_dir: &Path, dst_dir: &Path, abi: &str, api: u32) -> Result<()> {
    fs::create_dir_all(dst_dir)
        .with_context(|| format!("Failed to create {}", dst_dir.display()))?;

    fsutil::copy_file(&src_dir.join("libc++_shared.so"), &dst_dir.join("libc++_shared.so"))?;
    fsutil::copy_file(&src_dir.join("libc++_static.a"), &dst_dir.join("libc++_static.a"))?;
    if api < 21 {
        fsutil::copy_file(
            &src_dir.join("libandroid_support.a"),
            &dst_dir.join("libandroid_support.a"),
        )?;
    }
    fsutil::copy_file(&src_dir.join("libc++abi.a"), &dst_dir.join("libc++abi.a"))?;

    if abi == "armeabi-v7a" {
        fsutil::copy_file(&src_dir.join("libunwind.a"), &dst_dir.join("libunwind.a"))?;
    }

    // libc++.a and libc++.so are linker scripts that pull in libc++abi and
    // friends, so users do not have to spell those out. Installed under the
    // names the compiler links by default, with the API suffix dropped.
    fsutil::copy_file(
        &src_dir.join(format!("libc++.a.{api}")),
        &dst_dir.join("libstdc++.a"),
    )?;
    fsutil::copy_file(
        &src_dir.join(format!("libc++.so.{api}")),
        &dst_dir.join("libstdc++.so"),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abi_libdir_layout() {
        let install = Path::new("/t");
        assert_eq!(
            abi_libdir(install, "arm-linux-androideabi", "armeabi-v7a"),
            Path::new("/t/arm-linux-androideabi/lib/armv7-a")
        );
        assert_eq!(
            abi_libdir(install, "aarch64-linux-android", "arm64-v8a"),
            Path::new("/t/aarch64-linux-android/lib")
        );
        assert_eq!(
            abi_libdir(install, "x86_64-linux-android", "x86_64"),
            Path::new("/t/x86_64-linux-android/lib64")
        );
    }

    #[test]
    fn test_runtime_version_requires_exactly_one() {
        let tmp = tempfile::tempdir().unwrap();
        let lib_dir = tmp.path().join("lib/gcc/aarch64-linux-android");
        fs::create_dir_all(lib_dir.join("4.9.x")).unwrap();

        assert_eq!(
            runtime_version(tmp.path(), "aarch64-linux-android").unwrap(),
            "4.9.x"
        );

        fs::create_dir_all(lib_dir.join("4.8")).unwrap();
        let err = runtime_version(tmp.path(), "aarch64-linux-android").unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }
}
