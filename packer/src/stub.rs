//! Bootstrap stub of the archive.

/// Version embedded in generated stubs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Renders stub for an archive built by `version` of this tool.
///
/// When included, the stub mounts the directory containing the archive under
/// `<archive>/.mount/` (where rewritten autoload files look for project
/// sources) and returns result of the packed `autoload.php`.
pub fn render(version: &str) -> String {
    format!(
        r"<?php
declare(strict_types=1);

/**
 * Generated by vendor-compress.
 *
 * @version {version}
 */

\Phar::interceptFileFuncs();
\Phar::mount(\Phar::running(true) . '/.mount/', __DIR__ . DIRECTORY_SEPARATOR);

return require_once 'phar://' . __FILE__ . DIRECTORY_SEPARATOR . 'autoload.php';

__HALT_COMPILER();"
    )
}
