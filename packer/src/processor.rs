//! File processors. Contains [FileProcessor], a transformation applied to
//! content of selected files before they are packed.

use crate::{json, php};

/// Content transformation.
///
/// Processors are registered in [crate::config::Config] together with a
/// [crate::filter::FileFilter]. Each file passes through every processor whose
/// filter matches it, in registration order, each one receiving output of
/// the previous one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FileProcessor {
    /// Compacts JSON, see [json::minify]. Invalid JSON is left untouched.
    MinifyJson,
    /// Drops comments and collapses whitespace of PHP source, see
    /// [php::strip_whitespace].
    StripWhitespacesPhp,
}
impl FileProcessor {
    /// Transforms `content`. Never fails, content that cannot be processed is
    /// returned unchanged.
    pub fn process(
        &self,
        content: Vec<u8>,
    ) -> Vec<u8> {
        match self {
            Self::MinifyJson => json::minify(content),
            Self::StripWhitespacesPhp => php::strip_whitespace(&content),
        }
    }
}
