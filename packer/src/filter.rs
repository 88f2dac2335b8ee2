//! File filters. Contains [FileFilter], a predicate deciding whether given
//! [FsEntry] (file or directory found while walking the vendor directory)
//! matches.
//!
//! Filters are used in two places:
//! - as exclude / include rules in [crate::config::Config], deciding which
//!   entries end up in the archive,
//! - paired with [crate::processor::FileProcessor], deciding which files get
//!   processed.

use anyhow::{Context, Error};
use regex::Regex;
use std::{borrow::Cow, path::Path};

/// Kind of filesystem entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
    /// Directory, possibly reached through a symlink.
    Directory,
    /// Anything that is not a directory.
    File,
}

/// Single filesystem object seen by filters.
#[derive(Clone, Copy, Debug)]
pub struct FsEntry<'a> {
    /// Full path of the entry, as produced by the walk.
    pub path: &'a Path,
    /// Whether entry is a directory.
    pub kind: EntryKind,
}
impl<'a> FsEntry<'a> {
    /// Creates [self] from path and kind.
    pub fn new(
        path: &'a Path,
        kind: EntryKind,
    ) -> Self {
        Self { path, kind }
    }

    /// Creates [self] from walk entry. Kind of a symlink is resolved from its
    /// target, whether the walk follows links or not.
    pub fn from_dir_entry(dir_entry: &'a walkdir::DirEntry) -> Self {
        let kind = if dir_entry.file_type().is_dir()
            || (dir_entry.path_is_symlink() && dir_entry.path().is_dir())
        {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Self::new(dir_entry.path(), kind)
    }

    /// Last path segment, eg. `composer.json`.
    pub fn basename(&self) -> Cow<'a, str> {
        self.path
            .file_name()
            .map(|file_name| file_name.to_string_lossy())
            .unwrap_or_default()
    }

    /// Whole path as string.
    pub fn pathname(&self) -> Cow<'a, str> {
        self.path.to_string_lossy()
    }
}

/// Predicate over [FsEntry].
///
/// The set of filters is closed, construct them with associated functions,
/// eg. [FileFilter::extension] or wrap with [FileFilter::is_directory].
#[derive(Clone, Debug)]
pub enum FileFilter {
    /// Whole basename equals the name. ASCII case-insensitive unless
    /// `case_sensitive` is set.
    Basename {
        /// Expected basename.
        name: String,
        /// Compare bytes exactly.
        case_sensitive: bool,
    },
    /// Basename matches the regex. No anchors are added, so the pattern
    /// decides itself whether it matches part or whole of the basename.
    BasenameRegex(Regex),
    /// Basename ends with `.` followed by extension, ASCII case-insensitive.
    Extension(String),
    /// Entry is a directory and the wrapped filter matches.
    IsDirectory(Box<FileFilter>),
    /// Entry is a file and the wrapped filter matches.
    IsFile(Box<FileFilter>),
    /// Entry is a directory located at `vendor/<vendor_name>` or
    /// `vendor/<vendor_name>/<package_name>` (or anywhere below, when no
    /// package name is given).
    VendorPackage {
        /// Vendor segment, eg. `symfony`.
        vendor_name: String,
        /// Package segment, eg. `console`.
        package_name: Option<String>,
    },
}
impl FileFilter {
    /// Case-insensitive basename filter.
    pub fn basename(name: impl Into<String>) -> Self {
        Self::Basename {
            name: name.into(),
            case_sensitive: false,
        }
    }

    /// Case-sensitive basename filter.
    pub fn basename_case_sensitive(name: impl Into<String>) -> Self {
        Self::Basename {
            name: name.into(),
            case_sensitive: true,
        }
    }

    /// Basename regex filter. Fails if pattern is not a valid regex.
    pub fn basename_regex(pattern: &str) -> Result<Self, Error> {
        let regex = Regex::new(pattern).with_context(|| format!("invalid pattern {pattern:?}"))?;
        Ok(Self::BasenameRegex(regex))
    }

    /// Extension filter, `extension` given without leading dot.
    pub fn extension(extension: impl Into<String>) -> Self {
        Self::Extension(extension.into())
    }

    /// Restricts `inner` to directories.
    pub fn is_directory(inner: FileFilter) -> Self {
        Self::IsDirectory(Box::new(inner))
    }

    /// Restricts `inner` to files.
    pub fn is_file(inner: FileFilter) -> Self {
        Self::IsFile(Box::new(inner))
    }

    /// Vendor (and optionally package) directory filter.
    pub fn vendor_package(
        vendor_name: impl Into<String>,
        package_name: Option<String>,
    ) -> Self {
        Self::VendorPackage {
            vendor_name: vendor_name.into(),
            package_name,
        }
    }

    /// Checks whether `entry` matches this filter.
    pub fn matches(
        &self,
        entry: &FsEntry<'_>,
    ) -> bool {
        match self {
            Self::Basename {
                name,
                case_sensitive,
            } => {
                let basename = entry.basename();
                if *case_sensitive {
                    *basename == **name
                } else {
                    basename.eq_ignore_ascii_case(name)
                }
            }
            Self::BasenameRegex(regex) => regex.is_match(&entry.basename()),
            Self::Extension(extension) => {
                let basename = entry.basename();
                let basename = basename.as_bytes();

                // ".{extension}" at the very end
                let suffix_length = extension.len() + 1;
                basename.len() >= suffix_length && {
                    let suffix = &basename[basename.len() - suffix_length..];
                    suffix[0] == b'.' && suffix[1..].eq_ignore_ascii_case(extension.as_bytes())
                }
            }
            Self::IsDirectory(inner) => entry.kind == EntryKind::Directory && inner.matches(entry),
            Self::IsFile(inner) => entry.kind == EntryKind::File && inner.matches(entry),
            Self::VendorPackage {
                vendor_name,
                package_name,
            } => {
                entry.kind == EntryKind::Directory
                    && vendor_package_matches(
                        &entry.pathname(),
                        vendor_name,
                        package_name.as_deref(),
                    )
            }
        }
    }
}

/// Looks for `vendor`, `vendor_name` (and `package_name` if set) as
/// consecutive path segments. Both `/` and `\` separate segments.
fn vendor_package_matches(
    pathname: &str,
    vendor_name: &str,
    package_name: Option<&str>,
) -> bool {
    let segments = pathname.split(['/', '\\']).collect::<Vec<_>>();

    let expected = itertools::chain(["vendor", vendor_name], package_name).collect::<Vec<_>>();

    segments.windows(expected.len()).any(|window| {
        window
            .iter()
            .zip(&expected)
            .all(|(segment, expected)| segment.eq_ignore_ascii_case(expected))
    })
}

#[cfg(test)]
mod test {
    use super::{EntryKind, FileFilter, FsEntry};
    use std::path::Path;
    use test_case::test_case;

    fn file(path: &str) -> FsEntry<'_> {
        FsEntry::new(Path::new(path), EntryKind::File)
    }
    fn directory(path: &str) -> FsEntry<'_> {
        FsEntry::new(Path::new(path), EntryKind::Directory)
    }

    #[test_case("Foo.TXT", false, true; "case insensitive matches")]
    #[test_case("Foo.TXT", true, false; "case sensitive does not match")]
    #[test_case("foo.txt", true, true; "case sensitive exact")]
    #[test_case("foo.txt.bak", false, false; "whole string only")]
    #[test_case("afoo.txt", false, false; "no prefix allowed")]
    fn basename_returns_expected(
        name: &str,
        case_sensitive: bool,
        expected: bool,
    ) {
        let filter = if case_sensitive {
            FileFilter::basename_case_sensitive("foo.txt")
        } else {
            FileFilter::basename("foo.txt")
        };

        let path = format!("/var/www/vendor/{name}");
        assert_eq!(filter.matches(&file(&path)), expected);
        assert_eq!(filter.matches(&directory(&path)), expected);
    }

    #[test]
    fn basename_quotes_special_characters() {
        let filter = FileFilter::basename("a.b");
        assert!(filter.matches(&file("/dir/a.b")));
        assert!(!filter.matches(&file("/dir/axb")));
    }

    #[test_case("123456-word.ext", true; "full match")]
    #[test_case("07123456-word.ext", false; "prefixed")]
    #[test_case("123456-word", false; "no extension")]
    fn basename_regex_returns_expected(
        name: &str,
        expected: bool,
    ) {
        let filter = FileFilter::basename_regex(r"^\d{6}-\w+\.\w+$").unwrap();

        let path = format!("/tmp/{name}");
        assert_eq!(filter.matches(&file(&path)), expected);
        assert_eq!(filter.matches(&directory(&path)), expected);
    }

    #[test]
    fn basename_regex_is_not_anchored() {
        let filter = FileFilter::basename_regex("test").unwrap();
        assert!(filter.matches(&file("/a/phpunit-tests.xml")));
    }

    #[test]
    fn basename_regex_rejects_invalid_pattern() {
        assert!(FileFilter::basename_regex("(unclosed").is_err());
    }

    #[test_case("file.txt", true; "lowercase")]
    #[test_case("FILE.TXT", true; "uppercase")]
    #[test_case("file.txt.php", false; "not last extension")]
    #[test_case("filetxt", false; "no dot")]
    #[test_case(".txt", true; "dotfile")]
    #[test_case("txt", false; "bare")]
    fn extension_returns_expected(
        name: &str,
        expected: bool,
    ) {
        let filter = FileFilter::extension("txt");
        assert_eq!(filter.matches(&file(&format!("/x/{name}"))), expected);
    }

    #[test]
    fn is_directory_guards_kind() {
        let filter = FileFilter::is_directory(FileFilter::basename("tests"));
        assert!(filter.matches(&directory("/vendor/a/b/tests")));
        assert!(!filter.matches(&file("/vendor/a/b/tests")));
        assert!(!filter.matches(&directory("/vendor/a/b/src")));
    }

    #[test]
    fn is_file_guards_kind() {
        let filter = FileFilter::is_file(FileFilter::basename("tests"));
        assert!(filter.matches(&file("/vendor/a/b/tests")));
        assert!(!filter.matches(&directory("/vendor/a/b/tests")));
    }

    #[test_case(r"/var/www\vendor/acme/", true; "vendor directory")]
    #[test_case(r"/var/www\vendor/acme/package/", true; "package directory")]
    #[test_case(r"/var/www/vendor/acme", true; "without trailing separator")]
    #[test_case(r"C:\www\vendor\acme\package", true; "backslashes only")]
    #[test_case(r"/var/www\acme/", false; "missing vendor segment")]
    #[test_case(r"/var/www/myvendor/acme/", false; "vendor as suffix of segment")]
    #[test_case(r"/var/www/vendor/acme-other/", false; "vendor name as prefix")]
    #[test_case(r"/var/www/VENDOR/Acme/", true; "case insensitive")]
    fn vendor_package_without_package_returns_expected(
        path: &str,
        expected: bool,
    ) {
        let filter = FileFilter::vendor_package("acme", None);
        assert_eq!(filter.matches(&directory(path)), expected);
    }

    #[test_case(r"/var/www\vendor/acme/", false; "vendor directory only")]
    #[test_case(r"/var/www\vendor/acme/package/", true; "package directory")]
    #[test_case(r"/var/www\vendor/acme/package/src", true; "below package directory")]
    #[test_case(r"/var/www\vendor/acme/other/", false; "other package")]
    #[test_case(r"/var/www\vendor/acme/package-2/", false; "package name as prefix")]
    #[test_case(r"/var/www\acme/package/", false; "missing vendor segment")]
    fn vendor_package_with_package_returns_expected(
        path: &str,
        expected: bool,
    ) {
        let filter = FileFilter::vendor_package("acme", Some("package".to_owned()));
        assert_eq!(filter.matches(&directory(path)), expected);
    }

    #[test]
    fn vendor_package_handles_vendor_as_names() {
        let filter = FileFilter::vendor_package("vendor", Some("vendor".to_owned()));
        assert!(filter.matches(&directory("/srv/vendor/vendor/vendor/")));
        assert!(!filter.matches(&directory("/srv/vendor/vendor/")));
    }

    #[test]
    fn vendor_package_never_matches_files() {
        let filter = FileFilter::vendor_package("acme", None);
        assert!(!filter.matches(&file("/var/www/vendor/acme")));
    }
}
