#![doc(hidden)]

use anyhow::Error;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, Once},
};
use tempfile::TempDir;
use vendor_compress::{
    archive::{Container, create},
    config::Config,
    directory::SearchOptions,
    resolve::resolve,
};
use vendor_compress_common::phar::Phar;

// installs logger once per test binary, so `--nocapture` shows run details
pub fn logger_init() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        // another logger may already be set by the harness
        let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
    });
}

// data/vendor, a small composer vendor directory
pub fn vendor_fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("vendor")
}

// builds archive from `vendor_directory_path` into fresh temporary directory,
// returned directory has to be kept alive as long as the archive is used
pub fn build(
    vendor_directory_path: &Path,
    config: &Config,
) -> Result<(TempDir, Container), Error> {
    logger_init();

    let output = tempfile::tempdir()?;
    let paths = resolve(
        vendor_directory_path,
        &output.path().join("vendor.phar"),
        Path::new("."),
    )?;
    let container = create(&paths, config, &SearchOptions::default())?;

    Ok((output, container))
}

// builds data/vendor with default config and reads it back with the loader
fn build_and_load_vendor_fixture() -> Result<Phar, Error> {
    let (_output, container) = build(&vendor_fixture_path(), &Config::default())?;
    let phar = vendor_compress_loader::loader::load_file(container.path())?;

    Ok(phar)
}
pub fn build_and_load_vendor_fixture_cached() -> &'static Phar {
    static CACHE: LazyLock<Phar> = LazyLock::new(|| build_and_load_vendor_fixture().unwrap());
    &CACHE
}

// writes `files` (relative path, content) under `root`, creating directories
pub fn tree_write(
    root: &Path,
    files: &[(&str, &str)],
) -> Result<(), Error> {
    for (path, content) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }

    Ok(())
}
