use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, bail};
use dunce::canonicalize;
use once_cell::sync::OnceCell;

use crate::shell_exec::{CancellationToken, Cmd, CmdOutput};

use super::{GitError, repo_id_for_path, repo_id_for_url};

mod working_tree;
mod worktrees;

pub use working_tree::WorkingTree;
pub(crate) use working_tree::path_to_logging_context;

/// Global base path for repository operations, set by -C flag
static BASE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global base path for repository operations.
///
/// This should be called once at program startup from main().
/// If not called, defaults to "." (current directory).
pub fn set_base_path(path: PathBuf) {
    BASE_PATH.set(path).ok();
}

/// Get the base path for repository operations.
fn base_path() -> &'static PathBuf {
    static DEFAULT: OnceLock<PathBuf> = OnceLock::new();
    BASE_PATH
        .get()
        .unwrap_or_else(|| DEFAULT.get_or_init(|| PathBuf::from(".")))
}

/// Facts about the repository a command runs in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RepositoryInfo {
    /// Shared `.git` directory (absolute)
    pub git_common_dir: PathBuf,
    /// Top level of the worktree the command runs in
    pub worktree_root: PathBuf,
    /// Whether that worktree is the primary one
    pub is_primary: bool,
    pub remote_url: Option<String>,
    pub repo_id: String,
}

/// Cached values for git queries that don't change during a process run.
#[derive(Debug, Default)]
struct RepoCache {
    git_common_dir: OnceCell<PathBuf>,
    worktree_root: OnceCell<PathBuf>,
    primary_remote: OnceCell<String>,
    repo_id: OnceCell<String>,
}

/// Repository context for git operations.
///
/// # Examples
///
/// ```no_run
/// use wtm::git::Repository;
///
/// let repo = Repository::current();
/// for wt in repo.list_worktrees()? {
///     println!("{} {}", wt.name, wt.path.display());
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    cache: RepoCache,
    cancel: Option<CancellationToken>,
}

impl Repository {
    /// Create a repository context at the specified path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RepoCache::default(),
            cancel: None,
        }
    }

    /// Create a repository context for the current directory.
    ///
    /// If the -C flag was used, this uses that path instead of the actual
    /// current directory.
    pub fn current() -> Self {
        Self::at(base_path().clone())
    }

    /// Attach a cancellation token: every git command started through this
    /// repository (and its worktree handles) stops when it fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get the base path this repository was created with.
    pub fn base_path(&self) -> &Path {
        &self.path
    }

    /// Fail with [`GitError::NotInRepository`] unless the base path is inside a
    /// git repository.
    pub fn require_repository(&self) -> anyhow::Result<()> {
        self.git_common_dir().map(|_| ()).map_err(|_| {
            GitError::NotInRepository {
                path: self.path.clone(),
            }
            .into()
        })
    }

    /// Get the primary remote name for this repository.
    ///
    /// 1. git's `checkout.defaultRemote` if set and it has a URL
    /// 2. otherwise the first remote with a configured URL
    /// 3. `origin` if no remotes exist
    pub fn primary_remote(&self) -> anyhow::Result<&str> {
        self.cache
            .primary_remote
            .get_or_try_init(|| {
                if let Ok(default_remote) = self.run_command(&["config", "checkout.defaultRemote"])
                {
                    let default_remote = default_remote.trim();
                    if !default_remote.is_empty() && self.remote_url(default_remote).is_some() {
                        return Ok(default_remote.to_string());
                    }
                }

                // Parse "remote.<name>.url <value>"; ".url " as the delimiter keeps
                // remote names with dots intact
                let output = self
                    .run_command(&["config", "--get-regexp", r"remote\..+\.url"])
                    .unwrap_or_default();
                let first_remote = output.lines().next().and_then(|line| {
                    line.strip_prefix("remote.")
                        .and_then(|s| s.split_once(".url "))
                        .map(|(name, _)| name)
                });

                Ok(first_remote.unwrap_or("origin").to_string())
            })
            .map(String::as_str)
    }

    /// Get the URL for a remote, if configured.
    pub fn remote_url(&self, remote: &str) -> Option<String> {
        self.run_command(&["remote", "get-url", remote])
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
    }

    /// Get the git common directory (the shared `.git` directory).
    ///
    /// Always absolute. Cached for the lifetime of this Repository.
    pub fn git_common_dir(&self) -> anyhow::Result<&Path> {
        self.cache
            .git_common_dir
            .get_or_try_init(|| {
                let stdout = self.run_command(&["rev-parse", "--git-common-dir"])?;
                let path = PathBuf::from(stdout.trim());
                if path.is_relative() {
                    canonicalize(self.path.join(&path))
                        .context("Failed to resolve git common directory")
                } else {
                    Ok(path)
                }
            })
            .map(PathBuf::as_path)
    }

    /// Top level of the worktree containing the base path (canonicalized).
    pub fn worktree_root(&self) -> anyhow::Result<&Path> {
        self.cache
            .worktree_root
            .get_or_try_init(|| {
                let stdout = self.run_command(&["rev-parse", "--show-toplevel"])?;
                canonicalize(stdout.trim()).context("Failed to resolve worktree root")
            })
            .map(PathBuf::as_path)
    }

    /// Directory that identifies the repository on disk: the primary worktree
    /// for normal repositories, the bare directory otherwise.
    pub fn repository_dir(&self) -> anyhow::Result<PathBuf> {
        let common_dir = self.git_common_dir()?;
        let dir = if common_dir.file_name().is_some_and(|n| n == ".git") {
            common_dir.parent().unwrap_or(common_dir)
        } else {
            common_dir
        };
        Ok(canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()))
    }

    /// Stable identifier used to key per-repository config and exported as
    /// `WT_REPO_ID`.
    ///
    /// Derived from the primary remote's URL when there is one, otherwise from
    /// the repository directory. Identical from every worktree of a repository.
    pub fn repo_id(&self) -> anyhow::Result<&str> {
        self.cache
            .repo_id
            .get_or_try_init(|| {
                let remote = self.primary_remote()?;
                if let Some(url) = self.remote_url(remote) {
                    return Ok(repo_id_for_url(&url));
                }
                Ok(repo_id_for_path(&self.repository_dir()?))
            })
            .map(String::as_str)
    }

    /// Gather [`RepositoryInfo`] for the base path.
    pub fn info(&self) -> anyhow::Result<RepositoryInfo> {
        let worktree_root = self.worktree_root()?.to_path_buf();
        let remote_url = self.remote_url(self.primary_remote()?);
        Ok(RepositoryInfo {
            git_common_dir: self.git_common_dir()?.to_path_buf(),
            is_primary: super::Worktree::detect_primary(&worktree_root),
            worktree_root,
            remote_url,
            repo_id: self.repo_id()?.to_string(),
        })
    }

    /// Whether `reference` resolves (`git rev-parse --verify --quiet`).
    pub fn ref_exists(&self, reference: &str) -> bool {
        self.git_cmd(&self.path, &["rev-parse", "--verify", "--quiet", reference])
            .run()
            .success
    }

    /// Check if a local git branch exists.
    pub fn local_branch_exists(&self, branch: &str) -> bool {
        self.ref_exists(&format!("refs/heads/{branch}"))
    }

    /// Get a git config value. Returns None if the key doesn't exist.
    pub fn get_config(&self, key: &str) -> Option<String> {
        self.run_command(&["config", key])
            .ok()
            .map(|value| value.trim().to_string())
    }

    /// A handle for running git in the worktree at `path`.
    pub fn worktree_at(&self, path: impl Into<PathBuf>) -> WorkingTree<'_> {
        WorkingTree {
            repo: self,
            path: path.into(),
        }
    }

    pub(crate) fn git_cmd(&self, dir: &Path, args: &[&str]) -> Cmd {
        let mut cmd = Cmd::new("git")
            .args(args.iter().copied())
            .current_dir(dir)
            .context(path_to_logging_context(dir));
        if let Some(token) = &self.cancel {
            cmd = cmd.cancel_token(token.clone());
        }
        cmd
    }

    /// Run a git command in this repository's context and return stdout.
    ///
    /// # Examples
    /// ```no_run
    /// use wtm::git::Repository;
    ///
    /// let repo = Repository::current();
    /// let status = repo.run_command(&["status", "--porcelain"])?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = self.git_cmd(&self.path, args).run();
        check_output(args, output)
    }
}

/// Turn a git invocation's output into stdout or an error carrying git's
/// message. Output is traced at debug level.
pub(crate) fn check_output(args: &[&str], output: CmdOutput) -> anyhow::Result<String> {
    if output.cancelled {
        bail!("Cancelled: git {}", args.join(" "));
    }
    if !output.success {
        // Git uses \r for progress updates
        let stderr = output.stderr.replace('\r', "\n");
        for line in stderr.trim().lines() {
            log::debug!("  ! {}", line);
        }
        // Some git commands print errors to stdout
        let error_msg = [stderr.trim(), output.stdout.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if error_msg.is_empty() {
            bail!("git {} exited with code {}", args.join(" "), output.exit_code);
        }
        bail!("{}", error_msg);
    }

    for line in output.stdout.lines() {
        log::debug!("  {}", line);
    }
    Ok(output.stdout)
}
