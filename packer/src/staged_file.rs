//! Staged file (entry path and processed content combined) helpers. Contains
//! [StagedFile].

use crate::{
    common::entry_path::EntryPath,
    entry_path,
    filter::{FileFilter, FsEntry},
    processor::FileProcessor,
};
use anyhow::{Context, Error};
use std::{fs, path::Path};

/// Processed content of a file + its [EntryPath] (describing where the file
/// will be accessible inside the archive).
///
/// This is the item produced by [crate::directory::search] and materialized
/// into the scratch directory by [crate::archive::assemble].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StagedFile {
    /// The path inside the archive.
    pub entry_path: EntryPath,

    /// Content after all matching processors were applied.
    pub content: Box<[u8]>,
}
impl StagedFile {
    /// Creates [self] by reading file relative to given base directory and
    /// running it through matching processors.
    ///
    /// Given file (`entry`) to read and base directory path creates a [self]
    /// by preparing:
    /// - content, read from fs and passed through every processor from
    ///   `file_processors` whose filter matches `entry`, in order,
    /// - [EntryPath] with [entry_path::from_relative_path] (as relative path
    ///   between `entry` and `base_directory_path`).
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Error;
    /// # use std::{fs, path::Path};
    /// # use vendor_compress::{
    /// #     filter::{EntryKind, FileFilter, FsEntry},
    /// #     processor::FileProcessor,
    /// #     staged_file::StagedFile,
    /// # };
    /// #
    /// # fn main() -> Result<(), Error> {
    /// # let base_directory = tempfile::tempdir()?;
    /// # fs::create_dir(base_directory.path().join("acme"))?;
    /// # fs::write(
    /// #     base_directory.path().join("acme").join("composer.json"),
    /// #     "{ \"name\": \"acme/a\" }",
    /// # )?;
    /// #
    /// let path = base_directory.path().join("acme").join("composer.json");
    ///
    /// let staged_file = StagedFile::build_from_path(
    ///     &FsEntry::new(&path, EntryKind::File),
    ///     base_directory.path(),
    ///     &[(FileProcessor::MinifyJson, FileFilter::extension("json"))],
    /// )?;
    /// assert_eq!(&*staged_file.entry_path, "acme/composer.json");
    /// assert_eq!(&*staged_file.content, b"{\"name\":\"acme/a\"}");
    /// #
    /// # Ok(())
    /// # }
    /// ```
    pub fn build_from_path(
        entry: &FsEntry<'_>,
        base_directory_path: &Path,
        file_processors: &[(FileProcessor, FileFilter)],
    ) -> Result<Self, Error> {
        // strip prefix, so entry path is relative to search root
        let relative_path = entry
            .path
            .strip_prefix(base_directory_path)
            .context("resolve relative_path")?;

        let entry_path = entry_path::from_relative_path(relative_path)?;

        // read and process, handle is closed as soon as content is read
        let mut content = fs::read(entry.path).context("read content")?;
        for (file_processor, file_filter) in file_processors {
            if file_filter.matches(entry) {
                content = file_processor.process(content);
            }
        }

        Ok(Self {
            entry_path,
            content: content.into_boxed_slice(),
        })
    }
}
