//! Git operations and repository management

use std::path::{Path, PathBuf};

// Submodules
mod error;
mod parse;
mod repository;
mod url;


// Re-exports from submodules
pub use error::GitError;
pub use repository::{Repository, RepositoryInfo, WorkingTree, set_base_path};
pub use url::{RemoteUrl, repo_id_for_path, repo_id_for_url};

/// Lifecycle events that fire user hooks.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HookType {
    PostCreate,
    PostSelect,
    PostDelete,
    PostRename,
}

/// A worktree as reported by `git worktree list --porcelain`.
///
/// Never persisted: every listing re-derives the set from git.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Worktree {
    /// Directory basename; unique within a repository's worktree set.
    pub name: String,
    pub path: PathBuf,
    /// Commit id at HEAD.
    pub head: String,
    /// `None` when detached.
    pub branch: Option<String>,
    pub detached: bool,
    /// Exactly one worktree per repository: the one whose `.git` is a directory.
    pub is_primary: bool,
    /// Lock reason; `Some("")` when locked without one.
    pub locked: Option<String>,
    /// Prune reason; `Some("")` when prunable without one.
    pub prunable: Option<String>,
}

impl Worktree {
    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    pub fn is_prunable(&self) -> bool {
        self.prunable.is_some()
    }

    /// The worktree's directory is gone, or git already considers it prunable.
    pub fn is_orphaned(&self) -> bool {
        self.is_prunable() || !self.path.exists()
    }

    /// Branch for display and hook env; empty when detached.
    pub fn branch_or_empty(&self) -> &str {
        self.branch.as_deref().unwrap_or("")
    }

    /// Check whether `<path>/.git` is a real directory (primary worktree)
    /// rather than a pointer file (linked worktree).
    pub fn detect_primary(path: &Path) -> bool {
        path.join(".git").is_dir()
    }
}

/// Directory basename used as a worktree's name.
pub(crate) fn worktree_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
