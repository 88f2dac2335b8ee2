//! vendor-compress packs a Composer `vendor` directory into a single PHAR
//! archive, which mounts the project directory and loads the packed autoloader
//! when included. Archives can be read back with
//! [vendor-compress-loader](../vendor_compress_loader/index.html).
//!
//! Shipping one file instead of thousands speeds up deployments to targets
//! where many small files are expensive (FTP, network filesystems, shared
//! hosting). Files not needed at runtime (tests, docs, CI configs) can be left
//! out with filters, JSON and PHP sources can be shrunk with processors, and
//! both single entries and the whole archive can be compressed.
//!
//! This crate can be used in two ways:
//! - As a standalone application, installed with `cargo install`, this is the
//!   preferred way in deployment scripts / CI pipelines.
//! - As a library, when the set of filters is built programmatically.
//!
//! # Using as a standalone application
//!
//! `vendor-compress` provides up to date documentation with `$ vendor-compress
//! --help`. Run in project root with no arguments, it packs `./vendor` into
//! `./vendor.phar`:
//! ```text
//! $ vendor-compress \
//!     --exclude-directory tests \
//!     --exclude-extension md \
//!     --include-package acme/docs \
//!     --minify-json \
//!     --strip-php \
//!     --files-compression gz \
//!     vendor \
//!     vendor.phar
//! ```
//! Project code then replaces `require 'vendor/autoload.php';` with
//! `require 'vendor.phar';`.
//!
//! # Using as a library
//!
//! Describe the run with [config::Config], resolve locations with
//! [resolve::resolve] and run [archive::create]. Lower level building blocks
//! are available as well:
//! - [directory::search] walks the vendor directory, yielding
//!   [staged_file::StagedFile] for every selected file,
//! - [archive::assemble] writes staged files as an archive,
//! - [phar::Builder] with [phar::store_file] / [phar::store_memory] build
//!   and serialize archives directly.
//!
//! ### Examples
//! ```no_run
//! # use anyhow::Error;
//! # use std::path::Path;
//! # use vendor_compress::{
//! #     archive::create,
//! #     common::compression::CompressionMethod,
//! #     config::Config,
//! #     directory::SearchOptions,
//! #     filter::FileFilter,
//! #     processor::FileProcessor,
//! #     resolve::resolve,
//! # };
//!
//! # fn main() -> Result<(), Error> {
//! // vendor directory and archive path, relative to project root
//! let paths = resolve(
//!     Path::new("vendor"),
//!     Path::new("vendor.phar"),
//!     Path::new("/var/www/project"),
//! )?;
//!
//! // skip tests of all packages, but keep them for acme/package
//! let mut config = Config::default();
//! config
//!     .excluded_add(FileFilter::is_directory(FileFilter::basename("tests")))
//!     .included_add(FileFilter::vendor_package("acme", Some("package".to_owned())))
//!     .file_processor_add(FileProcessor::MinifyJson, [FileFilter::extension("json")]);
//! config.files_compression = CompressionMethod::Gzip;
//!
//! let container = create(&paths, &config, &SearchOptions::default())?;
//! println!("packed {} entries", container.count());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::new_without_default)]
#![warn(missing_docs)]

pub use vendor_compress_common as common;

pub mod archive;
pub mod autoload;
pub mod config;
pub mod directory;
pub mod entry_path;
pub mod filter;
pub mod json;
pub mod php;
pub mod phar;
pub mod processor;
pub mod resolve;
pub mod staged_file;
pub mod stub;
