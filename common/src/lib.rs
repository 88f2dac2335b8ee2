//! Common crate, containing types shared between
//! [vendor-compress](../vendor_compress/index.html) (the packer) and
//! [vendor-compress-loader](../vendor_compress_loader/index.html) (the
//! reader).
//!
//! The root type of this crate is [phar::Phar]. It's a collection (an ordered
//! map) of entries [entry::Entry] distinguished by [entry_path::EntryPath]
//! (a custom type for path inside the archive), together with the archive
//! alias and the bootstrap stub.
//!
//! Constants in this module describe the binary PHAR layout. Both the writer
//! and the reader use them, so the two sides never drift apart.

#![warn(missing_docs)]

pub mod compression;
pub mod entry;
pub mod entry_path;
pub mod phar;
pub mod signature;

/// Token terminating the stub. Everything after it (plus [STUB_SUFFIX]) is
/// the manifest.
pub const HALT_COMPILER: &[u8] = b"__HALT_COMPILER();";
/// Bytes appended after [HALT_COMPILER] when the stub is written.
pub const STUB_SUFFIX: &[u8] = b" ?>\r\n";

/// Manifest API version, as written by PHP 5.3+ (`1.1.1`).
pub const MANIFEST_API_VERSION: [u8; 2] = [0x11, 0x10];

/// Global flag: archive carries a signature.
pub const GLOBAL_FLAG_SIGNATURE: u32 = 0x0001_0000;
/// Global flag: at least one entry is gzip (deflate) compressed.
pub const GLOBAL_FLAG_COMPRESSED_GZ: u32 = 0x0000_1000;
/// Global flag: at least one entry is bzip2 compressed.
pub const GLOBAL_FLAG_COMPRESSED_BZ2: u32 = 0x0000_2000;

/// Entry flag mask for unix permission bits.
pub const ENTRY_FLAG_PERMISSIONS_MASK: u32 = 0x0000_01ff;
/// Entry flag: content is gzip (deflate) compressed.
pub const ENTRY_FLAG_COMPRESSED_GZ: u32 = 0x0000_1000;
/// Entry flag: content is bzip2 compressed.
pub const ENTRY_FLAG_COMPRESSED_BZ2: u32 = 0x0000_2000;
/// Mask of all entry compression flags.
pub const ENTRY_FLAG_COMPRESSION_MASK: u32 = ENTRY_FLAG_COMPRESSED_GZ | ENTRY_FLAG_COMPRESSED_BZ2;

/// Default permissions of newly added entries (`rw-r--r--`).
pub const ENTRY_DEFAULT_PERMISSIONS: u32 = 0o644;

/// Magic closing the signature block.
pub const SIGNATURE_MAGIC: &[u8; 4] = b"GBMB";
