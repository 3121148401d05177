// Not every test module uses every helper.
#![allow(dead_code)]

//! # Test utilities for wtm
//!
//! ## TestRepo
//!
//! `TestRepo` creates an isolated git repository in a temporary directory with
//! one commit on `main`. The repository lives at `<tmp>/repo`, so sibling
//! worktrees land next to it inside the same temporary directory and are
//! cleaned up with it.
//!
//! ## Environment isolation
//!
//! Git and `wtm` commands run with environments set per command:
//! - No global or system git config, fixed identity, no prompts
//! - `WTM_CONFIG_PATH` points at a per-test config file
//! - `HOME` points inside the temporary directory
//! - Color disabled so output can be compared as plain text
//!
//! Commit dates are left at the real clock; status staleness is computed
//! against the current time. Use [`TestRepo::commit_with_age`] for old commits.
//!
//! ## Path canonicalization
//!
//! Paths are canonicalized so macOS `/var -> /private/var` symlinks don't
//! break comparisons against what git reports.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Time constants for `commit_with_age()`, e.g. `40 * DAY`.
pub const MINUTE: i64 = 60;
pub const HOUR: i64 = 60 * MINUTE;
pub const DAY: i64 = 24 * HOUR;

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// Basic TestRepo fixture.
///
/// ```ignore
/// #[rstest]
/// fn test_something(repo: TestRepo) { .. }
/// ```
#[rstest::fixture]
pub fn repo() -> TestRepo {
    TestRepo::new()
}

/// Repo with an `origin` remote holding `main`.
#[rstest::fixture]
pub fn repo_with_remote(mut repo: TestRepo) -> TestRepo {
    repo.setup_remote();
    repo
}

/// Canonicalize without Windows verbatim prefixes.
pub fn canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}

pub fn check_git_status(output: &Output, cmd_desc: &str) {
    if !output.status.success() {
        panic!(
            "git {cmd_desc} failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Isolated git environment for `cmd`.
pub fn configure_git_cmd(cmd: &mut Command, git_config_path: &Path) {
    cmd.env("GIT_CONFIG_GLOBAL", git_config_path);
    cmd.env("GIT_CONFIG_SYSTEM", NULL_DEVICE);
    cmd.env("LC_ALL", "C");
    cmd.env("LANG", "C");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
}

pub struct TestRepo {
    temp_dir: TempDir, // Dropped last; removes every worktree with it
    root: PathBuf,
    pub worktrees: HashMap<String, PathBuf>,
    remote: Option<PathBuf>,
    config_path: PathBuf,
    git_config_path: PathBuf,
}

impl TestRepo {
    /// A repository on `main` with one commit.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("repo");
        std::fs::create_dir(&root).unwrap();
        let root = canonicalize(&root).unwrap();

        let git_config_path = temp_dir.path().join("test-gitconfig");
        std::fs::write(
            &git_config_path,
            "[user]\n\tname = Test User\n\temail = test@example.com\n\
             [init]\n\tdefaultBranch = main\n\
             [advice]\n\tdetachedHead = false\n",
        )
        .unwrap();

        let repo = Self {
            config_path: temp_dir.path().join("wtm-config.json"),
            temp_dir,
            root,
            worktrees: HashMap::new(),
            remote: None,
            git_config_path,
        };
        // Empty config: defaults, and no missing-file warning
        repo.write_config("");
        repo.run_git(&["init", "-q", "-b", "main"]);
        repo.commit("Initial commit");
        repo
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Parent of the repository; sibling worktrees are created here.
    pub fn parent_path(&self) -> &Path {
        self.root.parent().unwrap()
    }

    pub fn home_path(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write the wtm config file used by [`TestRepo::wtm_command`].
    pub fn write_config(&self, contents: &str) {
        std::fs::write(&self.config_path, contents).unwrap();
    }

    pub fn configure_git_cmd(&self, cmd: &mut Command) {
        configure_git_cmd(cmd, &self.git_config_path);
    }

    #[must_use]
    pub fn git_command(&self) -> Command {
        let mut cmd = Command::new("git");
        self.configure_git_cmd(&mut cmd);
        cmd.current_dir(&self.root);
        cmd
    }

    pub fn run_git(&self, args: &[&str]) {
        self.run_git_in(&self.root, args);
    }

    pub fn run_git_in(&self, dir: &Path, args: &[&str]) {
        let output = self
            .git_command()
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        check_git_status(&output, &args.join(" "));
    }

    /// Trimmed stdout of a git command in the repo root.
    pub fn git_output(&self, args: &[&str]) -> String {
        let output = self.git_command().args(args).output().unwrap();
        check_git_status(&output, &args.join(" "));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Configure `cmd` to run wtm against this repository.
    pub fn configure_wtm_cmd(&self, cmd: &mut Command) {
        for (key, _) in std::env::vars() {
            if key.starts_with("GIT_") || key.starts_with("WTM_") {
                cmd.env_remove(&key);
            }
        }
        self.configure_git_cmd(cmd);
        cmd.env("WTM_CONFIG_PATH", &self.config_path);
        cmd.env("HOME", self.home_path());
        cmd.env("XDG_CONFIG_HOME", self.home_path().join(".config"));
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("CLICOLOR_FORCE");
        cmd.env("RUST_LOG", "warn");
        cmd.current_dir(&self.root);
    }

    /// A `wtm` command running in the repository root.
    #[must_use]
    pub fn wtm_command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wtm"));
        self.configure_wtm_cmd(&mut cmd);
        cmd
    }

    /// Run wtm with `args`, panicking unless it succeeds.
    pub fn wtm(&self, args: &[&str]) -> WtmOutput {
        let output = self.wtm_command().args(args).output().unwrap();
        let output = WtmOutput::from(output);
        assert!(
            output.success,
            "wtm {} failed:\nstdout: {}\nstderr: {}",
            args.join(" "),
            output.stdout,
            output.stderr
        );
        output
    }

    /// Run wtm with `args`, panicking if it succeeds.
    pub fn wtm_fails(&self, args: &[&str]) -> WtmOutput {
        let output = WtmOutput::from(self.wtm_command().args(args).output().unwrap());
        assert!(
            !output.success,
            "wtm {} unexpectedly succeeded:\nstdout: {}",
            args.join(" "),
            output.stdout
        );
        output
    }

    /// `wtm list --format json`, parsed.
    pub fn list_json(&self) -> Vec<serde_json::Value> {
        let output = self.wtm(&["list", "--format", "json"]);
        serde_json::from_str(&output.stdout).unwrap()
    }

    /// Overwrite `file.txt` in `dir`, stage and commit it.
    pub fn commit_in(&self, dir: &Path, message: &str) {
        std::fs::write(dir.join("file.txt"), message).unwrap();
        self.run_git_in(dir, &["add", "file.txt"]);
        self.run_git_in(dir, &["commit", "-q", "-m", message]);
    }

    pub fn commit(&self, message: &str) {
        self.commit_in(&self.root, message);
    }

    /// Commit in `dir` with author and committer dates `age_seconds` in the past.
    pub fn commit_with_age(&self, dir: &Path, message: &str, age_seconds: i64) {
        let date = format!("{} +0000", chrono::Utc::now().timestamp() - age_seconds);
        std::fs::write(dir.join("file.txt"), message).unwrap();
        self.run_git_in(dir, &["add", "file.txt"]);
        let output = self
            .git_command()
            .current_dir(dir)
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_DATE", &date)
            .args(["commit", "-q", "-m", message])
            .output()
            .unwrap();
        check_git_status(&output, "commit");
    }

    /// Add a sibling worktree on a new branch, as `wtm create` would place it.
    pub fn add_worktree(&mut self, branch: &str) -> PathBuf {
        let path = self
            .parent_path()
            .join(format!("repo.{}", branch.replace('/', "-")));
        self.run_git(&[
            "worktree",
            "add",
            "-q",
            "-b",
            branch,
            path.to_str().unwrap(),
        ]);
        let path = canonicalize(&path).unwrap();
        self.worktrees.insert(branch.to_string(), path.clone());
        path
    }

    pub fn worktree_path(&self, branch: &str) -> &Path {
        self.worktrees
            .get(branch)
            .unwrap_or_else(|| panic!("no worktree for {branch}"))
    }

    pub fn create_branch(&self, branch: &str) {
        self.run_git(&["branch", branch]);
    }

    /// Create a bare `origin`, push `main` and fetch so `origin/main` exists.
    pub fn setup_remote(&mut self) {
        let remote = self.temp_dir.path().join("origin.git");
        let output = Command::new("git")
            .args(["init", "-q", "--bare", remote.to_str().unwrap()])
            .env("GIT_CONFIG_GLOBAL", &self.git_config_path)
            .env("GIT_CONFIG_SYSTEM", NULL_DEVICE)
            .output()
            .unwrap();
        check_git_status(&output, "init --bare");
        self.run_git(&["remote", "add", "origin", remote.to_str().unwrap()]);
        self.run_git(&["push", "-q", "origin", "main"]);
        self.run_git(&["fetch", "-q", "origin"]);
        self.remote = Some(remote);
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// Captured output of a wtm invocation, decoded.
#[derive(Debug)]
pub struct WtmOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for WtmOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// The list entry for the worktree named `name`.
pub fn entry<'a>(items: &'a [serde_json::Value], name: &str) -> &'a serde_json::Value {
    items
        .iter()
        .find(|item| item["name"] == name)
        .unwrap_or_else(|| panic!("no worktree named {name} in {items:#?}"))
}

/// Conditions of a list entry, as strings.
pub fn conditions(item: &serde_json::Value) -> Vec<String> {
    item["status"]["conditions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap().to_string())
        .collect()
}
