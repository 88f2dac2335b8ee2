//! Composer autoloader rewriting. Contains [rewrite], pointing project paths
//! used by Composer generated autoload files at the `.mount` directory of the
//! running archive.
//!
//! Composer resolves paths of the root project relative to `vendor/..`. Once
//! vendor lives inside an archive, this points inside the archive instead of
//! next to it, so these references are replaced with a path under the mount
//! point installed by the stub.

use crate::phar::Builder;
use anyhow::Error;
use regex::bytes::{NoExpand, Regex};
use std::{borrow::Cow, sync::LazyLock};

/// Autoload files defining `$baseDir = dirname($vendorDir);`.
pub const BASE_DIR_FILES: [&str; 4] = [
    "composer/autoload_classmap.php",
    "composer/autoload_files.php",
    "composer/autoload_namespaces.php",
    "composer/autoload_psr4.php",
];
/// Static autoloader, referencing project paths with `__DIR__ . '/../..'`.
pub const STATIC_FILE: &str = "composer/autoload_static.php";

static BASE_DIR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$baseDir\s*=\s*dirname\(\$vendorDir\);").unwrap());
const BASE_DIR_REPLACEMENT: &[u8] = br"$baseDir=\Phar::running(true).'/.mount';";

static STATIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__DIR__\s*\.\s*'/\.\./\.\.'\s*\.\s*").unwrap());
const STATIC_REPLACEMENT: &[u8] = b"PHAR_RUNNING . ";
const STATIC_NAMESPACE: &[u8] = br"namespace Composer\Autoload;";
const STATIC_NAMESPACE_REPLACEMENT: &[u8] =
    b"namespace Composer\\Autoload;\n\ndefine('PHAR_RUNNING',\\Phar::running(true).'/.mount');";

/// Replaces every `$baseDir = dirname($vendorDir);` (with any whitespace
/// around `=`) in `content`. Borrowed result means nothing was replaced.
pub fn base_dir_rewrite(content: &[u8]) -> Cow<'_, [u8]> {
    BASE_DIR_PATTERN.replace_all(content, NoExpand(BASE_DIR_REPLACEMENT))
}

/// Replaces every `__DIR__ . '/../..' . ` in `content` with `PHAR_RUNNING . `
/// and, if anything was replaced, defines `PHAR_RUNNING` right after the
/// namespace declaration. Content without such references is returned
/// borrowed, as is.
pub fn static_rewrite(content: &[u8]) -> Cow<'_, [u8]> {
    match STATIC_PATTERN.replace_all(content, NoExpand(STATIC_REPLACEMENT)) {
        Cow::Borrowed(content) => Cow::Borrowed(content),
        Cow::Owned(replaced) => Cow::Owned(replace_literal(
            &replaced,
            STATIC_NAMESPACE,
            STATIC_NAMESPACE_REPLACEMENT,
        )),
    }
}

// every non-overlapping occurrence, left to right
fn replace_literal(
    content: &[u8],
    from: &[u8],
    to: &[u8],
) -> Vec<u8> {
    let mut output = Vec::with_capacity(content.len() + to.len());
    let mut rest = content;
    while let Some(position) = rest.windows(from.len()).position(|window| window == from) {
        output.extend_from_slice(&rest[..position]);
        output.extend_from_slice(to);
        rest = &rest[position + from.len()..];
    }
    output.extend_from_slice(rest);
    output
}

/// Rewrites Composer autoload files present in `builder`. Missing files and
/// files without matching references are skipped, other entries are left
/// untouched.
pub fn rewrite(builder: &mut Builder) -> Result<(), Error> {
    for path in BASE_DIR_FILES {
        let content = match builder.entry_get(path) {
            Some(entry) => match base_dir_rewrite(&entry.content) {
                Cow::Owned(content) => content,
                Cow::Borrowed(_) => continue,
            },
            None => continue,
        };
        builder.entry_content_set(path, content.into_boxed_slice())?;
        log::debug!("rewrote {path}");
    }

    let content = match builder.entry_get(STATIC_FILE) {
        Some(entry) => match static_rewrite(&entry.content) {
            Cow::Owned(content) => Some(content),
            Cow::Borrowed(_) => None,
        },
        None => None,
    };
    if let Some(content) = content {
        builder.entry_content_set(STATIC_FILE, content.into_boxed_slice())?;
        log::debug!("rewrote {STATIC_FILE}");
    }

    Ok(())
}
