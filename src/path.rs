//! Worktree placement and path display helpers.

use std::path::{Path, PathBuf};

use normalize_path::NormalizePath;

use crate::config::PathStrategy;

/// Base directory for centralized placement when none is configured.
pub const DEFAULT_CENTRALIZED_BASE: &str = "~/.wtm/worktrees";

/// Get the user's home directory.
///
/// Uses the `home` crate which handles platform-specific detection:
/// - Unix: `$HOME` environment variable
/// - Windows: `USERPROFILE` or `HOMEDRIVE`/`HOMEPATH`
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}

/// Format a filesystem path for user-facing output.
///
/// Replaces home directory prefix with `~` (e.g., `/Users/alex/projects/app` -> `~/projects/app`).
/// Paths outside home are returned unchanged.
pub fn format_path_for_display(path: &Path) -> String {
    if let Some(home) = home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }

        let mut display_path = PathBuf::from("~");
        display_path.push(stripped);
        return display_path.display().to_string();
    }

    path.display().to_string()
}

/// Make a branch name usable as a single path component.
///
/// `feature/auth` → `feature-auth`. Both separators are replaced so a branch
/// never nests directories on any platform.
pub fn sanitize_branch_name(branch: &str) -> String {
    branch.replace(['/', '\\'], "-")
}

/// Expand `~` and `$VARS` in a configured base directory.
///
/// Undefined variables leave the string as written rather than failing;
/// only the tilde is expanded in that case.
pub fn expand_base(base: &str) -> PathBuf {
    let expanded = shellexpand::full(base)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(base).into_owned());
    PathBuf::from(expanded)
}

/// Compute where a worktree for `branch` is placed.
///
/// - `Sibling`: `<primary-parent>/<repo-name>.<branch>`
/// - `Centralized`: `<base>/<repo-name>/<branch>`, where a relative `base`
///   resolves against the primary worktree
///
/// `repo-name` is the primary worktree's directory name and the branch is
/// sanitized with [`sanitize_branch_name`]. The result is lexically
/// normalized (`..` components folded).
pub fn worktree_path_for(
    primary_worktree: &Path,
    branch: &str,
    strategy: PathStrategy,
    base: Option<&str>,
) -> PathBuf {
    let repo_name = primary_worktree
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string());
    let branch = sanitize_branch_name(branch);

    let path = match strategy {
        PathStrategy::Sibling => {
            let parent = primary_worktree.parent().unwrap_or(primary_worktree);
            parent.join(format!("{repo_name}.{branch}"))
        }
        PathStrategy::Centralized => {
            let base = expand_base(base.unwrap_or(DEFAULT_CENTRALIZED_BASE));
            let base = if base.is_absolute() {
                base
            } else {
                primary_worktree.join(base)
            };
            base.join(&repo_name).join(&branch)
        }
    };
    path.normalize()
}

/// The path a worktree moves to when renamed: same parent, new directory name.
pub fn renamed_worktree_path(current: &Path, new_name: &str) -> PathBuf {
    let new_name = sanitize_branch_name(new_name);
    match current.parent() {
        Some(parent) => parent.join(new_name),
        None => PathBuf::from(new_name),
    }
}
