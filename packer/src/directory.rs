//! Directory helpers. Contains [search] function, used to gather files from
//! vendor directory recursively, and [is_selected], deciding which entries
//! take part.

use crate::{
    config::Config,
    filter::{FileFilter, FsEntry},
    staged_file::StagedFile,
};
use anyhow::{Context, Error};
use std::path::Path;
use walkdir::WalkDir;

/// Settings for [search] function.
///
/// If not sure what to set here, use [Default].
#[derive(Debug)]
pub struct SearchOptions {
    /// Whether to follow links while traversing directories.
    pub follow_links: bool,
}
impl Default for SearchOptions {
    fn default() -> Self {
        Self { follow_links: true }
    }
}

/// Decides whether `entry` takes part in the archive.
///
/// Only the first exclude filter matching `entry` is taken into account.
/// Then, if any include filter matches too, the entry is kept, otherwise it
/// is dropped. Entry matching no exclude filter is always kept. A narrower
/// exclude placed after a broader one is never consulted for entries the
/// broader one already matched.
pub fn is_selected(
    excluded: &[FileFilter],
    included: &[FileFilter],
    entry: &FsEntry<'_>,
) -> bool {
    match excluded.iter().find(|file_filter| file_filter.matches(entry)) {
        Some(_) => included.iter().any(|file_filter| file_filter.matches(entry)),
        None => true,
    }
}

/// Searches fs recursively and builds [StagedFile] for each selected file.
///
/// Traverses directory specified in `path` using [SearchOptions], in file name
/// order. Every entry is checked with [is_selected] while walking, so
/// directories that are not selected are never entered. For every selected
/// file content is read and passed through processors from `config`. Paths
/// are created by stripping `path` from full file path.
///
/// The returned iterator is lazy and single-pass, files are read one by one as
/// it is advanced. First error (unreadable file, entry vanished while
/// walking) should be treated as fatal for the whole run.
///
/// # Examples
///
/// ```
/// # use anyhow::Error;
/// # use std::{collections::HashSet, fs};
/// # use vendor_compress::{
/// #     config::Config,
/// #     directory::{search, SearchOptions},
/// #     filter::FileFilter,
/// # };
/// #
/// # fn main() -> Result<(), Error> {
/// # let vendor = tempfile::tempdir()?;
/// # fs::create_dir_all(vendor.path().join("acme").join("package"))?;
/// # fs::write(vendor.path().join("autoload.php"), "<?php")?;
/// # fs::write(vendor.path().join("acme").join("package").join("README.md"), "# readme")?;
/// #
/// let mut config = Config::default();
/// config.excluded_add(FileFilter::extension("md"));
///
/// let entry_paths = search(vendor.path(), &config, &SearchOptions::default())
///     .map(|staged_file| staged_file.map(|staged_file| staged_file.entry_path.into_string()))
///     .collect::<Result<HashSet<_>, Error>>()?;
///
/// assert!(entry_paths.contains("autoload.php"));
/// assert!(!entry_paths.contains("acme/package/README.md"));
/// #
/// # Ok(())
/// # }
/// ```
pub fn search<'a>(
    path: &'a Path,
    config: &'a Config,
    options: &SearchOptions,
) -> impl Iterator<Item = Result<StagedFile, Error>> + 'a {
    WalkDir::new(path)
        .follow_links(options.follow_links)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        // pruning here skips whole subtree of excluded directories
        .filter_entry(|dir_entry| {
            is_selected(
                &config.excluded,
                &config.included,
                &FsEntry::from_dir_entry(dir_entry),
            )
        })
        .map(move |dir_entry| {
            // detect search errors
            let dir_entry = dir_entry.context("walk vendor directory")?;

            // we are interested in regular files only
            // if follow_links is true, this will be resolved as link target,
            // otherwise links are skipped
            if !dir_entry.file_type().is_file() {
                return Ok(None);
            }

            log::trace!("staging {}", dir_entry.path().display());

            // build file
            let staged_file = StagedFile::build_from_path(
                &FsEntry::from_dir_entry(&dir_entry),
                path,
                &config.file_processors,
            )
            .with_context(|| dir_entry.path().to_string_lossy().into_owned())?;

            // yield for processing
            Ok(Some(staged_file))
        })
        .filter_map(|entry_result| entry_result.transpose()) // strips Ok(None)
}
