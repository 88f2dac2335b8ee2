//! Archive assembly. Contains [assemble], writing selected files into a PHAR,
//! [create] running the whole pipeline, and [Container], the handle to the
//! result.

use crate::{
    autoload,
    common::{entry::Entry, phar::Phar},
    config::Config,
    directory::{SearchOptions, search},
    phar::{self, Builder},
    resolve::ResolvedPaths,
    staged_file::StagedFile,
    stub,
};
use anyhow::{Context, Error, ensure};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

/// Handle to a written archive.
///
/// Keeps the archive content (uncompressed entries) in memory together with
/// locations of the written files. Files stay on disk after the handle is
/// dropped.
#[derive(Debug)]
pub struct Container {
    phar: Phar,
    path: PathBuf,
    compressed_path: Option<PathBuf>,
}
impl Container {
    /// Number of entries.
    pub fn count(&self) -> usize {
        self.phar.count()
    }

    /// Entry under archive relative `path`, eg. `composer/autoload_psr4.php`.
    pub fn get(
        &self,
        path: &str,
    ) -> Option<&Entry> {
        self.phar.get(path)
    }

    /// Path of the archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of whole-archive compressed copy, if one was requested.
    pub fn compressed_path(&self) -> Option<&Path> {
        self.compressed_path.as_deref()
    }

    /// Archive content.
    pub fn phar(&self) -> &Phar {
        &self.phar
    }
}

fn staged_file_write(
    scratch_path: &Path,
    staged_file: &StagedFile,
) -> Result<(), Error> {
    let path = staged_file
        .entry_path
        .split('/')
        .fold(scratch_path.to_path_buf(), |path, segment| path.join(segment));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| parent.to_string_lossy().into_owned())?;
    }
    fs::write(&path, &staged_file.content).with_context(|| path.to_string_lossy().into_owned())?;

    Ok(())
}

/// Writes `staged_files` as PHAR archive into `destination`.
///
/// Steps, in order:
/// - staged files are written to a fresh scratch directory,
/// - archive is built from every file of that directory,
/// - Composer autoload files are rewritten, see [autoload::rewrite],
/// - bootstrap stub is installed, see [stub::render],
/// - entries are compressed with [Config::files_compression],
/// - archive is written to `destination`, then, if
///   [Config::archive_compression] is set, its compressed copy is written
///   next to it (`destination` with `.gz` / `.bz2` appended).
///
/// Compression methods and existence of `destination` parent directory are
/// checked before anything is read or written. First error from
/// `staged_files` aborts the run.
///
/// The scratch directory is removed on return, unless [Config::debug] is
/// set, in which case it is kept and its location is logged.
pub fn assemble(
    staged_files: impl IntoIterator<Item = Result<StagedFile, Error>>,
    config: &Config,
    destination: &Path,
) -> Result<Container, Error> {
    config.files_compression.ensure_supported()?;
    config.archive_compression.ensure_supported()?;
    let destination_directory = destination.parent().unwrap_or(Path::new("."));
    ensure!(
        destination_directory.as_os_str().is_empty() || destination_directory.is_dir(),
        "path for PHAR file does not exist or is inaccessible: {}",
        destination_directory.display()
    );

    // stage
    let started = Instant::now();
    let scratch = tempfile::Builder::new()
        .prefix("vendor")
        .tempdir()
        .context("create scratch directory")?;
    let mut staged_count = 0usize;
    for staged_file in staged_files {
        let staged_file = staged_file?;
        staged_file_write(scratch.path(), &staged_file)?;
        staged_count += 1;
    }
    log::debug!(
        "staged {} files in {} in {:?}",
        staged_count,
        scratch.path().display(),
        started.elapsed()
    );

    // build
    let started = Instant::now();
    let mut builder = Builder::new(config.alias.clone());
    builder.build_from_directory(scratch.path())?;
    autoload::rewrite(&mut builder)?;
    builder.stub_set(stub::render(stub::VERSION))?;
    log::debug!("built archive in {:?}", started.elapsed());

    if config.debug {
        let scratch_path = scratch.keep();
        log::debug!("scratch directory kept in {}", scratch_path.display());
    }

    // compress entries
    if config.files_compression.extension().is_some() {
        let started = Instant::now();
        builder.files_compress(config.files_compression)?;
        log::debug!(
            "entries marked for {} compression in {:?}",
            config.files_compression,
            started.elapsed()
        );
    }

    // write
    let started = Instant::now();
    let phar = builder.finalize();
    phar::store_file(&phar, destination)?;
    log::debug!(
        "written {} in {:?}",
        destination.display(),
        started.elapsed()
    );

    let compressed_path = if config.archive_compression.extension().is_some() {
        let started = Instant::now();
        let compressed_path =
            phar::store_compressed_file(destination, config.archive_compression)?;
        log::debug!(
            "written {} in {:?}",
            compressed_path.display(),
            started.elapsed()
        );
        Some(compressed_path)
    } else {
        None
    };

    Ok(Container {
        phar,
        path: destination.to_path_buf(),
        compressed_path,
    })
}

/// Packs vendor directory from `paths` into archive, also from `paths`.
///
/// Runs [search] over the vendor directory and passes its results to
/// [assemble].
///
/// # Examples
///
/// ```
/// # use anyhow::Error;
/// # use std::{fs, path::Path};
/// # use vendor_compress::{
/// #     archive::create, config::Config, directory::SearchOptions, filter::FileFilter,
/// #     resolve::resolve,
/// # };
/// #
/// # fn main() -> Result<(), Error> {
/// # let project = tempfile::tempdir()?;
/// # fs::create_dir_all(project.path().join("vendor").join("composer"))?;
/// # fs::write(project.path().join("vendor").join("autoload.php"), "<?php")?;
/// # fs::write(project.path().join("vendor").join("composer").join("LICENSE"), "MIT")?;
/// #
/// let paths = resolve(Path::new("vendor"), Path::new("vendor.phar"), project.path())?;
///
/// let mut config = Config::default();
/// config.excluded_add(FileFilter::basename("LICENSE"));
///
/// let container = create(&paths, &config, &SearchOptions::default())?;
/// assert_eq!(container.count(), 1);
/// assert!(container.get("autoload.php").is_some());
/// assert!(container.path().is_file());
/// #
/// # Ok(())
/// # }
/// ```
pub fn create(
    paths: &ResolvedPaths,
    config: &Config,
    search_options: &SearchOptions,
) -> Result<Container, Error> {
    log::info!(
        "packing {} into {}",
        paths.vendor_directory_path.display(),
        paths.phar_path.display()
    );

    let started = Instant::now();
    let container = assemble(
        search(&paths.vendor_directory_path, config, search_options),
        config,
        &paths.phar_path,
    )?;

    log::info!(
        "packed {} entries into {} in {:?}",
        container.count(),
        container.path().display(),
        started.elapsed()
    );
    if let Some(compressed_path) = container.compressed_path() {
        log::info!("compressed copy written to {}", compressed_path.display());
    }

    Ok(container)
}
