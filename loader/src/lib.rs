//! vendor-compress-loader is the reading part of
//! [vendor-compress](../vendor_compress/index.html). It parses PHAR archives
//! written by the packer back into [common::phar::Phar], so their content can
//! be inspected without PHP.
//!
//! Every archive is checked while loading: stub terminator, manifest bounds,
//! CRC-32 of every entry and SHA-256 signature of the whole file. Any mismatch
//! is reported as an error, a partially valid archive is never returned.
//!
//! # Examples
//! ```no_run
//! # use anyhow::Error;
//! # use std::path::Path;
//! # use vendor_compress_loader::loader::load_file;
//!
//! # fn main() -> Result<(), Error> {
//! let phar = load_file(Path::new("vendor.phar"))?;
//!
//! for (entry_path, entry) in &phar.entries_by_path {
//!     println!("{entry_path}: {} bytes", entry.content.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub use vendor_compress_common as common;

pub mod loader;
