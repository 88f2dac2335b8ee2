//! Main packer executable, to be used as cli tool. For help run this command
//! with `-h`.

#![warn(missing_docs)]

use anyhow::{Context, Error, ensure};
use clap::{Args, Parser};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::{env, path::PathBuf};
use vendor_compress::{
    archive,
    common::compression::CompressionMethod,
    config::Config,
    directory,
    filter::FileFilter,
    processor::FileProcessor,
    resolve,
};

/// Packs composer vendor directory into a single PHAR archive.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    /// Alias the archive registers itself under.
    #[arg(long, default_value = "vendor.phar")]
    pub alias: String,

    /// Compression of single entries: `none`, `gz` or `bz2`.
    #[arg(long, default_value = "none")]
    pub files_compression: CompressionMethod,

    /// Compression of the whole archive, written next to it as `.gz` / `.bz2`
    /// file: `none`, `gz` or `bz2`.
    #[arg(long, default_value = "none")]
    pub archive_compression: CompressionMethod,

    #[command(flatten)]
    pub exclude: ExcludeFilters,

    #[command(flatten)]
    pub include: IncludeFilters,

    /// Minify `*.json` files.
    #[arg(long)]
    pub minify_json: bool,

    /// Strip comments and whitespace from `*.php` files.
    #[arg(long)]
    pub strip_php: bool,

    /// Whether to follow links while traversing directories. If not set,
    /// uses sane defaults.
    #[arg(long)]
    pub follow_links: Option<bool>,

    /// Log stage timings and keep the scratch directory.
    #[arg(long)]
    pub debug: bool,

    /// The vendor directory to be packed, relative to current directory.
    #[arg(default_value = "vendor")]
    pub vendor_directory_path: PathBuf,

    /// Output archive path. Relative directory is resolved against parent of
    /// vendor directory.
    #[arg(default_value = "vendor.phar")]
    pub output_file_path: PathBuf,
}

#[derive(Args, Debug)]
struct ExcludeFilters {
    /// Exclude files with given extension (without dot). Can be repeated.
    #[arg(long = "exclude-extension", value_name = "EXTENSION")]
    pub extensions: Vec<String>,
    /// Exclude entries with given name (case-insensitive). Can be repeated.
    #[arg(long = "exclude-basename", value_name = "NAME")]
    pub basenames: Vec<String>,
    /// Exclude entries with name matching the regex. Can be repeated.
    #[arg(long = "exclude-basename-regex", value_name = "PATTERN")]
    pub basename_regexes: Vec<String>,
    /// Exclude directories with given name (case-insensitive). Can be
    /// repeated.
    #[arg(long = "exclude-directory", value_name = "NAME")]
    pub directories: Vec<String>,
    /// Exclude `VENDOR` or `VENDOR/PACKAGE`. Can be repeated.
    #[arg(long = "exclude-package", value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

#[derive(Args, Debug)]
struct IncludeFilters {
    /// Re-include excluded files with given extension. Can be repeated.
    #[arg(long = "include-extension", value_name = "EXTENSION")]
    pub extensions: Vec<String>,
    /// Re-include excluded entries with given name. Can be repeated.
    #[arg(long = "include-basename", value_name = "NAME")]
    pub basenames: Vec<String>,
    /// Re-include excluded entries with name matching the regex. Can be
    /// repeated.
    #[arg(long = "include-basename-regex", value_name = "PATTERN")]
    pub basename_regexes: Vec<String>,
    /// Re-include excluded directories with given name. Can be repeated.
    #[arg(long = "include-directory", value_name = "NAME")]
    pub directories: Vec<String>,
    /// Re-include `VENDOR` or `VENDOR/PACKAGE`. Can be repeated.
    #[arg(long = "include-package", value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

// both groups share the same shape, clap just needs distinct flag names
fn file_filters(
    extensions: Vec<String>,
    basenames: Vec<String>,
    basename_regexes: Vec<String>,
    directories: Vec<String>,
    packages: Vec<String>,
) -> Result<Vec<FileFilter>, Error> {
    let mut file_filters = Vec::new();

    file_filters.extend(extensions.into_iter().map(FileFilter::extension));
    file_filters.extend(basenames.into_iter().map(FileFilter::basename));
    for pattern in basename_regexes {
        file_filters.push(FileFilter::basename_regex(&pattern)?);
    }
    file_filters.extend(
        directories
            .into_iter()
            .map(|name| FileFilter::is_directory(FileFilter::basename(name))),
    );
    for package in packages {
        file_filters.push(package_filter(&package)?);
    }

    Ok(file_filters)
}

fn package_filter(package: &str) -> Result<FileFilter, Error> {
    let (vendor_name, package_name) = match package.split_once('/') {
        Some((vendor_name, package_name)) => (vendor_name, Some(package_name.to_owned())),
        None => (package, None),
    };
    ensure!(
        !vendor_name.is_empty() && package_name.as_deref().is_none_or(|name| !name.is_empty()),
        "invalid package {package:?}, expected VENDOR or VENDOR/PACKAGE"
    );

    Ok(FileFilter::vendor_package(vendor_name, package_name))
}

fn main() -> Result<(), Error> {
    let arguments = Arguments::parse();

    SimpleLogger::new()
        .with_level(if arguments.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init()?;

    let mut config = Config {
        alias: arguments.alias,
        files_compression: arguments.files_compression,
        archive_compression: arguments.archive_compression,
        debug: arguments.debug,
        ..Config::default()
    };

    let ExcludeFilters {
        extensions,
        basenames,
        basename_regexes,
        directories,
        packages,
    } = arguments.exclude;
    for file_filter in file_filters(
        extensions,
        basenames,
        basename_regexes,
        directories,
        packages,
    )? {
        config.excluded_add(file_filter);
    }

    let IncludeFilters {
        extensions,
        basenames,
        basename_regexes,
        directories,
        packages,
    } = arguments.include;
    for file_filter in file_filters(
        extensions,
        basenames,
        basename_regexes,
        directories,
        packages,
    )? {
        config.included_add(file_filter);
    }

    if arguments.minify_json {
        config.file_processor_add(FileProcessor::MinifyJson, [FileFilter::extension("json")]);
    }
    if arguments.strip_php {
        config.file_processor_add(
            FileProcessor::StripWhitespacesPhp,
            [FileFilter::extension("php")],
        );
    }

    let mut search_options = directory::SearchOptions::default();
    if let Some(follow_links) = arguments.follow_links {
        search_options.follow_links = follow_links;
    }

    let current_directory = env::current_dir().context("read current directory")?;
    let paths = resolve::resolve(
        &arguments.vendor_directory_path,
        &arguments.output_file_path,
        &current_directory,
    )?;

    archive::create(&paths, &config, &search_options)?;

    Ok(())
}
