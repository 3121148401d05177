use std::path::PathBuf;

use wtm::config::{ResolvedConfig, WtmConfig};
use wtm::git::{GitError, Repository};
use wtm::status::StatusOptions;

/// Shared execution context for command handlers.
///
/// Centralizes the "repo + config + repo id" setup so handlers share
/// consistent error messaging. The config is loaded once here and passed
/// around by reference from then on.
pub(crate) struct CommandEnv {
    pub repo: Repository,
    pub config: WtmConfig,
    pub repo_id: String,
    /// `config` with this repository's overrides applied
    pub resolved: ResolvedConfig,
}

impl CommandEnv {
    /// Load the environment for the repository at the base path (`-C` or cwd).
    pub fn load() -> anyhow::Result<Self> {
        let repo = Repository::current();
        repo.require_repository()?;
        let config = WtmConfig::load();
        let repo_id = repo.repo_id()?.to_string();
        let resolved = ResolvedConfig::for_repo(&config, Some(&repo_id));

        Ok(Self {
            repo,
            config,
            repo_id,
            resolved,
        })
    }

    /// Status inputs from the resolved config.
    pub fn status_options(&self) -> StatusOptions {
        StatusOptions::for_repo(
            &self.repo,
            self.resolved.comparison_branch.clone(),
            self.resolved.stale_days,
        )
    }

    /// The primary worktree's path; bare repositories have none.
    pub fn primary_worktree(&self) -> anyhow::Result<PathBuf> {
        self.repo.primary_worktree_path()?.ok_or_else(|| {
            GitError::Other {
                message: "Repository has no primary worktree (bare repository?)".into(),
            }
            .into()
        })
    }

    /// Where hooks for a removed worktree run: the primary worktree, else the
    /// repository directory.
    pub fn repository_root(&self) -> anyhow::Result<PathBuf> {
        match self.repo.primary_worktree_path()? {
            Some(path) => Ok(path),
            None => self.repo.repository_dir(),
        }
    }
}
