//! Entry path contains custom type for representing path inside a PHAR.

use std::{borrow::Borrow, fmt, ops::Deref};

/// [EntryPath] represents path of an entry inside a PHAR, relative to the
/// archive root and always using `/` as separator, eg.
/// `composer/autoload_static.php`.
///
/// Custom type is used to keep paths apart from plain strings. Ordering is
/// plain byte ordering of the path, which is also the order entries are
/// written in.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EntryPath {
    inner: String,
}
impl EntryPath {
    /// Construct path from string representation. Refer to [self] for details.
    pub fn from_string(inner: String) -> Self {
        Self { inner }
    }

    /// Returns inner string.
    pub fn into_string(self) -> String {
        self.inner
    }
}

// to allow searching in BTreeMap directly by str
impl Deref for EntryPath {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl Borrow<str> for EntryPath {
    fn borrow(&self) -> &str {
        self.inner.as_str()
    }
}
impl fmt::Display for EntryPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.inner)
    }
}
