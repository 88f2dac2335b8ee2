//! Entry path helpers. Contains [from_relative_path] that creates entry paths
//! from fs paths.

use crate::common::entry_path::EntryPath;
use anyhow::{Error, anyhow, ensure};
use std::path::{Component, Path};

/// Creates entry path (eg. "dir1/dir2/file.php") from relative fs path (eg.
/// "dir1\\dir2\\file.php").
///
/// # Examples
///
/// ```
/// # use anyhow::Error;
/// # use std::path::PathBuf;
/// # use vendor_compress::{
/// #    common::entry_path::EntryPath, entry_path::from_relative_path,
/// # };
/// #
/// # fn main() -> Result<(), Error> {
/// #
/// assert_eq!(
///     from_relative_path(&PathBuf::from("composer/autoload_psr4.php"))?,
///     EntryPath::from_string("composer/autoload_psr4.php".to_owned()),
/// );
/// #
/// # Ok(())
/// # }
/// ```
pub fn from_relative_path(relative_path: &Path) -> Result<EntryPath, Error> {
    ensure!(relative_path.is_relative(), "path must be relative, got {relative_path:?}");

    // list of path components, eg. ["dir1", "dir2", "file.bin"]
    let components = relative_path
        .components()
        .map(|component| {
            // we cannot handle things like '/' or '.' or '..' here
            ensure!(
                matches!(component, Component::Normal(_)),
                "relative path must contain only standard path items, got {:?}",
                component
            );

            component
                .as_os_str()
                .to_str()
                .ok_or_else(|| anyhow!("cannot convert path component to string"))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    ensure!(!components.is_empty(), "path must not be empty");

    // separators are already split off by `components`, on unix `\` is a
    // regular file name character
    let entry_path = itertools::join(components, "/");

    Ok(EntryPath::from_string(entry_path))
}

#[cfg(test)]
mod test {
    use super::from_relative_path;
    use crate::common::entry_path::EntryPath;
    use std::path::{Path, PathBuf};
    use test_case::test_case;

    #[test_case(
        &PathBuf::from("autoload.php"),
        &EntryPath::from_string("autoload.php".to_owned());
        "file in root"
    )]
    #[test_case(
        &PathBuf::from("acme/package/src/Foo.php"),
        &EntryPath::from_string("acme/package/src/Foo.php".to_owned());
        "linux like relative path"
    )]
    fn from_relative_path_returns_expected(
        path: &Path,
        expected: &EntryPath,
    ) {
        assert_eq!(&from_relative_path(path).unwrap(), expected);
    }

    #[cfg(windows)]
    #[test]
    fn from_relative_path_converts_windows_separators() {
        assert_eq!(
            from_relative_path(Path::new("composer\\autoload_static.php")).unwrap(),
            EntryPath::from_string("composer/autoload_static.php".to_owned())
        );
    }

    #[cfg(unix)]
    #[test]
    fn from_relative_path_keeps_backslash_in_file_name() {
        assert_eq!(
            from_relative_path(Path::new("acme/a\\b.txt")).unwrap(),
            EntryPath::from_string("acme/a\\b.txt".to_owned())
        );
    }

    #[test_case(&PathBuf::from("/etc/passwd"); "absolute")]
    #[test_case(&PathBuf::from("../outside.php"); "parent")]
    #[test_case(&PathBuf::from(""); "empty")]
    fn from_relative_path_rejects(path: &Path) {
        assert!(from_relative_path(path).is_err());
    }
}
