//! Test repository lookup
//!
//! "I successfully run ... in repository ..." steps resolve a named
//! repository to a directory under the context's repository root.

use std::path::PathBuf;

use crate::context::ScenarioContext;

/// Look up a repository directory by name.
///
/// Returns `None` when no directory with that name exists under the
/// repository root — the step layer turns that into a lookup error.
pub fn get_repo_dir(ctx: &ScenarioContext, name: &str) -> Option<PathBuf> {
    let dir = ctx.repo_root.join(name);
    if dir.is_dir() {
        Some(dir)
    } else {
        None
    }
}
