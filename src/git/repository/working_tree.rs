//! WorkingTree - a borrowed handle for worktree-specific git operations.

use std::path::{Path, PathBuf};

use super::{Repository, check_output};
use crate::git::parse::{parse_branch_list, parse_left_right_counts};

/// Get a short display name for a path, used in logging context.
pub(crate) fn path_to_logging_context(path: &Path) -> String {
    if path.to_str() == Some(".") {
        ".".to_string()
    } else {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(".")
            .to_string()
    }
}

/// A borrowed handle for running git commands in a specific worktree.
///
/// The status engine reads a worktree exclusively through this type (via
/// [`crate::status::StatusSource`]), so every query runs with the worktree as
/// its working directory.
///
/// ```no_run
/// use wtm::git::Repository;
///
/// let repo = Repository::current();
/// let wt = repo.worktree_at("/path/to/worktree");
/// let _ = wt.is_dirty();
/// let _ = wt.ahead_behind("origin/main");
/// ```
#[derive(Debug)]
#[must_use]
pub struct WorkingTree<'a> {
    pub(super) repo: &'a Repository,
    pub(super) path: PathBuf,
}

impl<'a> WorkingTree<'a> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn repo(&self) -> &'a Repository {
        self.repo
    }

    /// Run a git command in this worktree and return stdout.
    pub fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = self.repo.git_cmd(&self.path, args).run();
        check_output(args, output)
    }

    /// Check if the working tree has uncommitted changes (tracked or untracked).
    pub fn is_dirty(&self) -> anyhow::Result<bool> {
        let stdout = self.run_command(&["status", "--porcelain"])?;
        Ok(!stdout.trim().is_empty())
    }

    /// Whether `reference` resolves from this worktree.
    pub fn ref_exists(&self, reference: &str) -> bool {
        self.repo
            .git_cmd(&self.path, &["rev-parse", "--verify", "--quiet", reference])
            .run()
            .success
    }

    /// Commits `(ahead, behind)` of HEAD relative to `base`.
    ///
    /// `git rev-list --left-right --count base...HEAD` prints `behind ahead`.
    /// Returns `None` when the output doesn't parse.
    pub fn ahead_behind(&self, base: &str) -> anyhow::Result<Option<(usize, usize)>> {
        let range = format!("{base}...HEAD");
        let stdout = self.run_command(&["rev-list", "--left-right", "--count", &range])?;
        Ok(parse_left_right_counts(&stdout).map(|(behind, ahead)| (ahead, behind)))
    }

    /// Local branches whose tips are reachable from `target`.
    pub fn merged_branches(&self, target: &str) -> anyhow::Result<Vec<String>> {
        let stdout = self.run_command(&["branch", "--merged", target])?;
        Ok(parse_branch_list(&stdout))
    }

    /// Unix timestamp of the latest commit reachable from HEAD.
    ///
    /// `None` for unborn branches or unparseable output.
    pub fn last_commit_timestamp(&self) -> anyhow::Result<Option<i64>> {
        let stdout = self.run_command(&["log", "-1", "--format=%ct", "HEAD"])?;
        Ok(stdout.trim().parse().ok())
    }

    /// Get the branch checked out in this worktree, or None if detached.
    pub fn branch(&self) -> anyhow::Result<Option<String>> {
        let stdout = self.run_command(&["branch", "--show-current"])?;
        let branch = stdout.trim();
        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }
}
