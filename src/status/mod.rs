//! Derived worktree status.
//!
//! Status is never stored: every request re-runs a handful of cheap git
//! queries in the worktree and classifies the answers. Each query can fail on
//! its own; a failed query leaves its part of the status unknown and the rest
//! is still computed.
//!
//! The git queries sit behind [`StatusSource`], implemented by
//! [`WorkingTree`], so the classification can be exercised without a
//! repository.

use std::collections::BTreeSet;

use crate::git::{Repository, WorkingTree, Worktree};

mod collect;

pub use collect::{StatusUpdate, collect_statuses, stream_statuses};

const SECONDS_PER_DAY: i64 = 86_400;

/// Default age after which a worktree counts as stale.
pub const DEFAULT_STALE_DAYS: u32 = 30;

/// Facts that can hold for a worktree at the same time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    strum::Display,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Condition {
    /// Uncommitted or untracked changes
    Dirty,
    /// Branch tip is contained in the merge target
    Merged,
    /// Last commit older than the stale threshold
    Stale,
    /// Directory gone or git marks the entry prunable
    Orphan,
}

/// Relationship of HEAD to the comparison branch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SyncState {
    Synced,
    Ahead,
    Behind,
    Diverged,
}

impl SyncState {
    pub fn from_counts(ahead: usize, behind: usize) -> Self {
        match (ahead > 0, behind > 0) {
            (true, true) => Self::Diverged,
            (true, false) => Self::Ahead,
            (false, true) => Self::Behind,
            (false, false) => Self::Synced,
        }
    }
}

/// How the comparison branch was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseResolution {
    /// A comparison branch was found and sync was computed (or attempted)
    Resolved,
    /// The worktree is the mainline and the comparison branch is local, so
    /// comparing would measure the branch against itself
    SelfCompare,
    /// No configured comparison branch and none of the candidates resolve
    Missing,
}

/// Ordered ref candidates probed when nothing is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCandidates {
    /// Comparison branch candidates, first resolving wins
    pub comparison: Vec<String>,
    /// Local mainline candidates, first existing wins
    pub mainline: Vec<String>,
}

impl BranchCandidates {
    /// `<remote>/main`, `<remote>/master`, `main`, `master`; mainline `main`, `master`.
    pub fn for_remote(remote: &str) -> Self {
        Self {
            comparison: vec![
                format!("{remote}/main"),
                format!("{remote}/master"),
                "main".to_string(),
                "master".to_string(),
            ],
            mainline: vec!["main".to_string(), "master".to_string()],
        }
    }
}

/// Inputs to status computation that are shared by every worktree.
#[derive(Debug, Clone)]
pub struct StatusOptions {
    /// Configured comparison branch; skips candidate probing
    pub comparison_branch: Option<String>,
    pub stale_days: u32,
    /// Current Unix timestamp
    pub now: i64,
    pub candidates: BranchCandidates,
}

impl StatusOptions {
    /// Options for `repo`: candidates from its primary remote, `now` from the clock.
    pub fn for_repo(
        repo: &Repository,
        comparison_branch: Option<String>,
        stale_days: u32,
    ) -> Self {
        let remote = repo.primary_remote().unwrap_or("origin");
        Self {
            comparison_branch,
            stale_days,
            now: chrono::Utc::now().timestamp(),
            candidates: BranchCandidates::for_remote(remote),
        }
    }

    /// The same options evaluated at the current time.
    pub fn refreshed(&self) -> Self {
        Self {
            now: chrono::Utc::now().timestamp(),
            ..self.clone()
        }
    }
}

/// Derived status of one worktree.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct WorktreeStatus {
    pub conditions: BTreeSet<Condition>,
    pub sync: Option<SyncState>,
    /// Present iff `sync` is present
    pub ahead: Option<usize>,
    /// Present iff `sync` is present
    pub behind: Option<usize>,
    pub comparison_branch: Option<String>,
    /// `None` for orphans, where nothing was evaluated
    pub base: Option<BaseResolution>,
    /// Unix timestamp of the latest commit, when known
    pub last_commit: Option<i64>,
}

impl WorktreeStatus {
    fn empty() -> Self {
        Self {
            conditions: BTreeSet::new(),
            sync: None,
            ahead: None,
            behind: None,
            comparison_branch: None,
            base: None,
            last_commit: None,
        }
    }

    /// Status of a worktree whose directory is gone: only `orphan`.
    pub fn orphan() -> Self {
        let mut status = Self::empty();
        status.conditions.insert(Condition::Orphan);
        status
    }

    pub fn has(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    fn set_counts(&mut self, ahead: usize, behind: usize) {
        self.sync = Some(SyncState::from_counts(ahead, behind));
        self.ahead = Some(ahead);
        self.behind = Some(behind);
    }
}

/// Git queries the status engine needs, answered for one worktree.
pub trait StatusSource {
    /// Non-empty `git status --porcelain`.
    fn is_dirty(&self) -> anyhow::Result<bool>;
    /// `git rev-parse --verify --quiet <reference>` succeeds.
    fn ref_exists(&self, reference: &str) -> bool;
    /// `(ahead, behind)` of HEAD relative to `base`; `None` if unparseable.
    fn ahead_behind(&self, base: &str) -> anyhow::Result<Option<(usize, usize)>>;
    /// Branches merged into `target`.
    fn merged_branches(&self, target: &str) -> anyhow::Result<Vec<String>>;
    /// Timestamp of the latest commit on HEAD.
    fn last_commit_timestamp(&self) -> anyhow::Result<Option<i64>>;
}

impl StatusSource for WorkingTree<'_> {
    fn is_dirty(&self) -> anyhow::Result<bool> {
        WorkingTree::is_dirty(self)
    }

    fn ref_exists(&self, reference: &str) -> bool {
        WorkingTree::ref_exists(self, reference)
    }

    fn ahead_behind(&self, base: &str) -> anyhow::Result<Option<(usize, usize)>> {
        WorkingTree::ahead_behind(self, base)
    }

    fn merged_branches(&self, target: &str) -> anyhow::Result<Vec<String>> {
        WorkingTree::merged_branches(self, target)
    }

    fn last_commit_timestamp(&self) -> anyhow::Result<Option<i64>> {
        WorkingTree::last_commit_timestamp(self)
    }
}

/// Status of a listed worktree. Orphans skip every git query.
pub fn worktree_status(repo: &Repository, worktree: &Worktree, opts: &StatusOptions) -> WorktreeStatus {
    if worktree.is_orphaned() {
        return WorktreeStatus::orphan();
    }
    compute_status(&repo.worktree_at(&worktree.path), worktree.branch.as_deref(), opts)
}

/// Classify a worktree from its git answers.
///
/// 1. dirty: non-empty porcelain status
/// 2. comparison branch: configured, else first resolving candidate
/// 3. mainline: first existing local candidate; the worktree is the mainline
///    when its branch has that name
/// 4. ahead/behind: unless the worktree is the mainline and the comparison
///    branch is local
/// 5. merged: behind, not the mainline, on a branch, and listed by
///    `git branch --merged <target>`
/// 6. stale: last commit strictly older than `stale_days`
pub fn compute_status(
    source: &impl StatusSource,
    branch: Option<&str>,
    opts: &StatusOptions,
) -> WorktreeStatus {
    let mut status = WorktreeStatus::empty();

    match source.is_dirty() {
        Ok(true) => {
            status.conditions.insert(Condition::Dirty);
        }
        Ok(false) => {}
        Err(e) => log::debug!("dirty check failed: {e:#}"),
    }

    let comparison = opts.comparison_branch.clone().or_else(|| {
        opts.candidates
            .comparison
            .iter()
            .find(|candidate| source.ref_exists(candidate))
            .cloned()
    });

    match comparison {
        None => status.base = Some(BaseResolution::Missing),
        Some(cmp) => {
            let mainline = opts
                .candidates
                .mainline
                .iter()
                .find(|name| source.ref_exists(&format!("refs/heads/{name}")));
            let is_mainline = branch.is_some() && branch == mainline.map(String::as_str);
            let remote_qualified = source.ref_exists(&format!("refs/remotes/{cmp}"));

            if is_mainline && !remote_qualified {
                status.base = Some(BaseResolution::SelfCompare);
            } else {
                status.base = Some(BaseResolution::Resolved);
                match source.ahead_behind(&cmp) {
                    Ok(Some((ahead, behind))) => status.set_counts(ahead, behind),
                    Ok(None) => log::debug!("unparseable ahead/behind against {cmp}"),
                    Err(e) => log::debug!("ahead/behind against {cmp} failed: {e:#}"),
                }
            }

            if let (Some(branch), Some(behind)) = (branch, status.behind)
                && behind >= 1
                && !is_mainline
            {
                let target = if remote_qualified {
                    cmp.as_str()
                } else {
                    mainline.map(String::as_str).unwrap_or(cmp.as_str())
                };
                match source.merged_branches(target) {
                    Ok(merged) if merged.iter().any(|b| b == branch) => {
                        status.conditions.insert(Condition::Merged);
                    }
                    Ok(_) => {}
                    Err(e) => log::debug!("merged check against {target} failed: {e:#}"),
                }
            }

            status.comparison_branch = Some(cmp);
        }
    }

    match source.last_commit_timestamp() {
        Ok(Some(ts)) => {
            status.last_commit = Some(ts);
            if is_stale(ts, opts.now, opts.stale_days) {
                status.conditions.insert(Condition::Stale);
            }
        }
        Ok(None) => {}
        Err(e) => log::debug!("last commit lookup failed: {e:#}"),
    }

    status
}

/// Age strictly greater than `stale_days` days.
pub fn is_stale(last_commit: i64, now: i64, stale_days: u32) -> bool {
    now.saturating_sub(last_commit) > i64::from(stale_days) * SECONDS_PER_DAY
}
