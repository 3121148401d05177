//! Worktree listing and lifecycle operations for Repository.

use std::path::{Path, PathBuf};

use dunce::canonicalize;
use normalize_path::NormalizePath;

use super::Repository;
use crate::git::{GitError, Worktree};
use crate::path::format_path_for_display;

/// Borrow a path as a git argument, rejecting non-UTF-8 paths.
fn path_arg(path: &Path) -> anyhow::Result<&str> {
    path.to_str().ok_or_else(|| {
        GitError::Other {
            message: format!(
                "Worktree path contains invalid UTF-8: {}",
                format_path_for_display(path)
            ),
        }
        .into()
    })
}

/// Compare paths after resolving symlinks (macOS `/var` → `/private/var`),
/// falling back to lexical normalization for paths that no longer exist.
fn same_path(a: &Path, b: &Path) -> bool {
    match (canonicalize(a), canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.normalize() == b.normalize(),
    }
}

impl Repository {
    /// List all worktrees for this repository.
    ///
    /// Bare entries are dropped. Each worktree's `is_primary` flag is set by
    /// checking whether its `.git` is a directory.
    pub fn list_worktrees(&self) -> anyhow::Result<Vec<Worktree>> {
        let stdout = self.run_command(&["worktree", "list", "--porcelain"])?;
        let mut worktrees = Worktree::parse_porcelain_list(&stdout);
        for wt in &mut worktrees {
            wt.is_primary = Worktree::detect_primary(&wt.path);
        }
        Ok(worktrees)
    }

    /// The primary worktree's path, if the repository has one (bare repos don't).
    pub fn primary_worktree_path(&self) -> anyhow::Result<Option<PathBuf>> {
        Ok(self
            .list_worktrees()?
            .into_iter()
            .find(|wt| wt.is_primary)
            .map(|wt| wt.path))
    }

    /// The worktree containing the base path, if any.
    pub fn current_worktree_info(&self) -> anyhow::Result<Option<Worktree>> {
        let Ok(current_path) = self.worktree_root() else {
            return Ok(None);
        };
        let current_path = current_path.to_path_buf();
        Ok(self
            .list_worktrees()?
            .into_iter()
            .find(|wt| same_path(&wt.path, &current_path)))
    }

    /// Look up a worktree by name, then by branch, then by path.
    ///
    /// `@` refers to the worktree containing the base path.
    pub fn find_worktree(&self, query: &str) -> anyhow::Result<Worktree> {
        if query == "@" {
            return self
                .current_worktree_info()?
                .ok_or_else(|| GitError::WorktreeNotFound { name: "@".into() }.into());
        }

        let worktrees = self.list_worktrees()?;
        find_in(&worktrees, query, self.base_path())
            .cloned()
            .ok_or_else(|| {
                GitError::WorktreeNotFound {
                    name: query.to_string(),
                }
                .into()
            })
    }

    /// Create a worktree at `path`.
    ///
    /// With `create_branch`, runs `git worktree add -b <branch> <path> [<base>]`;
    /// otherwise checks out the existing `branch`.
    pub fn add_worktree(
        &self,
        path: &Path,
        branch: &str,
        base: Option<&str>,
        create_branch: bool,
    ) -> anyhow::Result<()> {
        if path.exists() {
            return Err(GitError::WorktreePathExists {
                path: path.to_path_buf(),
            }
            .into());
        }
        let path_str = path_arg(path)?;
        let mut args = vec!["worktree", "add"];
        if create_branch {
            args.extend(["-b", branch, path_str]);
            args.extend(base);
        } else {
            args.extend([path_str, branch]);
        }
        self.run_command(&args).map_err(|e| GitError::WorktreeCreationFailed {
            branch: branch.to_string(),
            base: base.map(str::to_string),
            error: e.to_string(),
        })?;
        Ok(())
    }

    /// Remove a worktree.
    ///
    /// When `force` is true, passes `--force` to `git worktree remove`,
    /// allowing removal even when the worktree contains untracked files.
    pub fn remove_worktree(&self, worktree: &Worktree, force: bool) -> anyhow::Result<()> {
        if worktree.is_primary {
            return Err(GitError::CannotRemovePrimaryWorktree.into());
        }
        if worktree.is_locked() && !force {
            return Err(GitError::WorktreeLocked {
                name: worktree.name.clone(),
                path: worktree.path.clone(),
                reason: worktree.locked.clone(),
            }
            .into());
        }
        let path_str = path_arg(&worktree.path)?;
        let mut args = vec!["worktree", "remove"];
        if force {
            // Twice: a locked worktree needs a second --force
            args.extend(["--force", "--force"]);
        }
        args.push(path_str);
        self.run_command(&args)
            .map_err(|e| GitError::WorktreeRemovalFailed {
                name: worktree.name.clone(),
                path: worktree.path.clone(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    /// Move a worktree to a new path (`git worktree move`).
    pub fn move_worktree(&self, worktree: &Worktree, to: &Path) -> anyhow::Result<()> {
        if to.exists() {
            return Err(GitError::WorktreePathExists {
                path: to.to_path_buf(),
            }
            .into());
        }
        let from_str = path_arg(&worktree.path)?;
        let to_str = path_arg(to)?;
        self.run_command(&["worktree", "move", from_str, to_str])
            .map_err(|e| GitError::WorktreeMoveFailed {
                name: worktree.name.clone(),
                to: to.to_path_buf(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    /// Lock a worktree so `git worktree prune` and `wtm remove` leave it alone.
    pub fn lock_worktree(&self, path: &Path, reason: Option<&str>) -> anyhow::Result<()> {
        let path_str = path_arg(path)?;
        let mut args = vec!["worktree", "lock"];
        if let Some(reason) = reason {
            args.extend(["--reason", reason]);
        }
        args.push(path_str);
        self.run_command(&args)?;
        Ok(())
    }

    pub fn unlock_worktree(&self, path: &Path) -> anyhow::Result<()> {
        let path_str = path_arg(path)?;
        self.run_command(&["worktree", "unlock", path_str])?;
        Ok(())
    }

    /// Delete a local branch (`-d`, or `-D` when `force`).
    pub fn delete_branch(&self, branch: &str, force: bool) -> anyhow::Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run_command(&["branch", flag, branch])
            .map_err(|e| GitError::BranchDeletionFailed {
                branch: branch.to_string(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    /// Prune worktree entries whose directories no longer exist.
    pub fn prune_worktrees(&self) -> anyhow::Result<()> {
        self.run_command(&["worktree", "prune"])?;
        Ok(())
    }
}

/// Name, then branch, then path (relative paths resolve against `cwd`).
pub(crate) fn find_in<'w>(worktrees: &'w [Worktree], query: &str, cwd: &Path) -> Option<&'w Worktree> {
    worktrees
        .iter()
        .find(|wt| wt.name == query)
        .or_else(|| {
            worktrees
                .iter()
                .find(|wt| wt.branch.as_deref() == Some(query))
        })
        .or_else(|| {
            let candidate = Path::new(query);
            let candidate = if candidate.is_absolute() {
                candidate.to_path_buf()
            } else {
                cwd.join(candidate)
            };
            worktrees.iter().find(|wt| same_path(&wt.path, &candidate))
        })
}
