//! Phar is the root entity, a collection of entries.

use crate::{entry::Entry, entry_path::EntryPath};
use std::collections::BTreeMap;

/// Phar represents a PHP archive: a group of entries distinguished by their
/// path, an alias the archive registers itself under and a stub (bootstrap
/// PHP code executed when the archive is included).
///
/// Entries are kept ordered by path, so building the same tree twice yields
/// byte-identical manifests (except for timestamps).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Phar {
    /// Alias of the archive, eg. `vendor.phar`.
    pub alias: String,
    /// Bootstrap code, ending with `__HALT_COMPILER();`.
    pub stub: String,
    /// List of contained entries by their paths.
    pub entries_by_path: BTreeMap<EntryPath, Entry>,
}
impl Phar {
    /// Number of entries.
    pub fn count(&self) -> usize {
        self.entries_by_path.len()
    }

    /// Given archive relative path, eg. `composer/autoload_psr4.php` returns
    /// entry associated with this path. Returns [None] if entry for given path
    /// does not exist.
    pub fn get(
        &self,
        path: &str,
    ) -> Option<&Entry> {
        self.entries_by_path.get(path)
    }
}
