//! Run configuration. Contains [Config], describing which files are packed,
//! how they are processed and how the archive is compressed.

use crate::{filter::FileFilter, processor::FileProcessor};
use vendor_compress_common::compression::CompressionMethod;

/// Settings for a single archive build.
///
/// If not sure what to set here, use [Default] and add filters / processors
/// with the `*_add` helpers.
///
/// # Excluding and including
///
/// An entry is dropped when any of [Self::excluded] matches it and none of
/// [Self::included] does. Excludes are checked in order and only the first
/// matching one counts, includes then act as overrides ("firewall" style
/// deny / allow). Excluding a directory prunes the whole subtree unless an
/// include re-includes that directory.
///
/// # Processing
///
/// [Self::file_processors] are applied to every packed file whose paired
/// filter matches, in order, output of one being input of the next.
#[derive(Clone, Debug)]
pub struct Config {
    /// Alias the archive registers itself under.
    pub alias: String,
    /// Compression of single entries.
    pub files_compression: CompressionMethod,
    /// Compression of the whole archive, written next to it as separate file.
    pub archive_compression: CompressionMethod,
    /// Filters excluding entries.
    pub excluded: Vec<FileFilter>,
    /// Filters re-including excluded entries.
    pub included: Vec<FileFilter>,
    /// Processors with filters selecting files they are applied to.
    pub file_processors: Vec<(FileProcessor, FileFilter)>,
    /// Log timings of each stage and keep the scratch directory.
    pub debug: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            alias: "vendor.phar".to_owned(),
            files_compression: CompressionMethod::None,
            archive_compression: CompressionMethod::None,
            excluded: Vec::new(),
            included: Vec::new(),
            file_processors: Vec::new(),
            debug: false,
        }
    }
}
impl Config {
    /// Appends exclude filter.
    pub fn excluded_add(
        &mut self,
        file_filter: FileFilter,
    ) -> &mut Self {
        self.excluded.push(file_filter);
        self
    }

    /// Appends include filter.
    pub fn included_add(
        &mut self,
        file_filter: FileFilter,
    ) -> &mut Self {
        self.included.push(file_filter);
        self
    }

    /// Registers `file_processor` once per given filter, in order.
    pub fn file_processor_add(
        &mut self,
        file_processor: FileProcessor,
        file_filters: impl IntoIterator<Item = FileFilter>,
    ) -> &mut Self {
        self.file_processors.extend(
            file_filters
                .into_iter()
                .map(|file_filter| (file_processor, file_filter)),
        );
        self
    }
}
