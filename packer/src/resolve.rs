//! Path resolution. Contains [resolve], turning user supplied vendor directory
//! and archive paths into absolute ones.

use anyhow::{Context, Error, bail, ensure};
use std::path::{Path, PathBuf};

/// Absolute, existing locations of a single run.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResolvedPaths {
    /// Canonical vendor directory, root of the walk.
    pub vendor_directory_path: PathBuf,
    /// Archive path, parent directory is canonical and exists, file name ends
    /// with `.phar`.
    pub phar_path: PathBuf,
}

/// Resolves `vendor_directory_path` and `phar_path` against
/// `base_directory_path`.
///
/// The vendor directory is resolved against `base_directory_path` and must
/// exist. Directory part of `phar_path` is resolved against the parent of the
/// vendor directory, empty directory part or `.` means the parent itself.
/// That directory must exist as well. File name of `phar_path` must have
/// `phar` extension.
///
/// Absolute paths are taken as they are, since joining replaces the base.
/// Nothing is created and the current working directory is never changed.
///
/// # Examples
///
/// ```
/// # use anyhow::Error;
/// # use std::{fs, path::Path};
/// # use vendor_compress::resolve::resolve;
/// #
/// # fn main() -> Result<(), Error> {
/// # let project = tempfile::tempdir()?;
/// # fs::create_dir(project.path().join("vendor"))?;
/// #
/// let resolved = resolve(Path::new("vendor"), Path::new("vendor.phar"), project.path())?;
///
/// let project_path = project.path().canonicalize()?;
/// assert_eq!(resolved.vendor_directory_path, project_path.join("vendor"));
/// assert_eq!(resolved.phar_path, project_path.join("vendor.phar"));
/// #
/// # Ok(())
/// # }
/// ```
pub fn resolve(
    vendor_directory_path: &Path,
    phar_path: &Path,
    base_directory_path: &Path,
) -> Result<ResolvedPaths, Error> {
    let vendor_directory_path = base_directory_path
        .join(vendor_directory_path)
        .canonicalize()
        .context("vendor path does not exist or is inaccessible")?;
    ensure!(
        vendor_directory_path.is_dir(),
        "vendor path {} is not a directory",
        vendor_directory_path.display()
    );

    let file_name = match phar_path.file_name() {
        Some(file_name) => file_name,
        None => bail!("path for PHAR file {} has no file name", phar_path.display()),
    };
    ensure!(
        Path::new(file_name)
            .extension()
            .is_some_and(|extension| extension == "phar"),
        "path for PHAR file {} must have phar extension",
        phar_path.display()
    );

    // canonical path always has a parent, unless it is the root itself
    let vendor_parent_path = match vendor_directory_path.parent() {
        Some(vendor_parent_path) => vendor_parent_path,
        None => vendor_directory_path.as_path(),
    };

    let phar_directory_path = match phar_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && parent != Path::new(".") => {
            vendor_parent_path
                .join(parent)
                .canonicalize()
                .context("path for PHAR file does not exist or is inaccessible")?
        }
        _ => vendor_parent_path.to_path_buf(),
    };
    ensure!(
        phar_directory_path.is_dir(),
        "path for PHAR file {} is not a directory",
        phar_directory_path.display()
    );

    let phar_path = phar_directory_path.join(file_name);

    Ok(ResolvedPaths {
        vendor_directory_path,
        phar_path,
    })
}
