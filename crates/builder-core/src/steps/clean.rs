//! Removal of build output

use crate::fsutil;
use crate::project::TARGET_DIR;
use anyhow::Result;
use std::path::Path;

/// Delete the `target/` folder of a project. Returns whether anything was removed.
pub fn run(root: &Path) -> Result<bool> {
    fsutil::remove_dir(&root.join(TARGET_DIR))
}
