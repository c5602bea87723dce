//! Creates a standalone toolchain installation for a given Android target.

use anyhow::Result;
use clap::Parser;
use env_logger::Builder as LogBuilder;
use log::{warn, LevelFilter};
use std::path::PathBuf;

use ndk_standalone::arch::Arch;
use ndk_standalone::{assemble, host, ndk, package, resolve_api, resolve_install_dir};

#[derive(Parser)]
#[command(
    name = "make-standalone-toolchain",
    about = "Creates a toolchain installation for a given Android target.",
    version
)]
struct Cli {
    /// Target architecture.
    #[arg(long, value_enum)]
    arch: Arch,

    /// Target the given API version (example: "--api 24").
    #[arg(long)]
    api: Option<u32>,

    /// Ignored. Retained for compatibility.
    #[arg(long, hide = true)]
    stl: Option<String>,

    /// NDK installation root. Defaults to $ANDROID_NDK_ROOT or
    /// $ANDROID_NDK_HOME.
    #[arg(long)]
    ndk: Option<PathBuf>,

    /// Remove existing installation directory if it exists.
    #[arg(long)]
    force: bool,

    /// Increase output verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Build a tarball and install it to the given directory. If neither
    /// --package-dir nor --install-dir is specified, a tarball is created
    /// in the current directory.
    #[arg(long, conflicts_with = "install_dir")]
    package_dir: Option<PathBuf>,

    /// Install the toolchain to the given directory instead of packaging.
    #[arg(long)]
    install_dir: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    LogBuilder::from_default_env().filter_level(level).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.stl.is_some() {
        warn!("--stl is ignored; the toolchain always ships libc++");
    }

    let ndk = ndk::Ndk::locate(cli.ndk)?;
    ndk.check()?;

    let api = resolve_api(cli.arch, cli.api)?;
    let host = host::detect(ndk.root())?;
    let triple = cli.arch.triple();

    let platform_sysroot = ndk.sysroot(cli.arch, api)?;
    let gcc_path = ndk.gcc_toolchain(cli.arch, host)?;
    let clang_path = ndk.clang_toolchain(host)?;

    // The guard keeps any auto-created temporary directory alive through
    // packaging and removes it on every exit path.
    let (install_path, tempdir) =
        resolve_install_dir(cli.install_dir.as_deref(), triple, cli.force)?;

    assemble::create_toolchain(
        &install_path,
        cli.arch,
        api,
        &gcc_path,
        &clang_path,
        &platform_sysroot,
        &ndk,
        host,
    )?;

    if cli.install_dir.is_none() {
        let package_dir = match cli.package_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        package::package(&install_path, &package_dir, host)?;
    }

    drop(tempdir);
    Ok(())
}
