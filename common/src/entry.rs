//! Entry represents single file of a PHAR, accessible under specific path.

use crate::{ENTRY_DEFAULT_PERMISSIONS, compression::CompressionMethod};

/// [Entry] represents single file stored in the archive.
///
/// `content` is always kept uncompressed in memory. `compression` only
/// describes how it is (or will be) stored on disk, compressing happens while
/// writing and decompressing while reading.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Entry {
    /// Raw (not compressed) file contents.
    pub content: Box<[u8]>,
    /// How the content is stored inside the archive.
    pub compression: CompressionMethod,
    /// Modification time, unix timestamp.
    pub timestamp: u32,
    /// Unix permission bits.
    pub permissions: u32,
}
impl Entry {
    /// Creates uncompressed entry with default permissions.
    pub fn new(
        content: Box<[u8]>,
        timestamp: u32,
    ) -> Self {
        Self {
            content,
            compression: CompressionMethod::None,
            timestamp,
            permissions: ENTRY_DEFAULT_PERMISSIONS,
        }
    }
}
