//! Git output parsing functions
//!
//! Parsers here never fail: malformed input yields fewer results, and the
//! caller treats a missing value as "unknown".

use std::path::PathBuf;

use super::{Worktree, worktree_name};

/// One block of `git worktree list --porcelain` output while it's being read.
#[derive(Default)]
struct PendingWorktree {
    path: Option<PathBuf>,
    head: Option<String>,
    branch: Option<String>,
    bare: bool,
    detached: bool,
    locked: Option<String>,
    prunable: Option<String>,
}

impl PendingWorktree {
    /// Blocks without a path or HEAD (bare entries, truncated output) are dropped.
    fn finish(self) -> Option<Worktree> {
        let path = self.path?;
        let head = self.head?;
        if self.bare {
            return None;
        }
        Some(Worktree {
            name: worktree_name(&path),
            path,
            head,
            branch: self.branch,
            detached: self.detached,
            is_primary: false,
            locked: self.locked,
            prunable: self.prunable,
        })
    }
}

impl Worktree {
    /// Parse `git worktree list --porcelain`.
    ///
    /// Blocks are separated by blank lines and hold `key [value]` lines.
    /// `is_primary` is left `false`; listing fills it in from the filesystem.
    pub(crate) fn parse_porcelain_list(output: &str) -> Vec<Self> {
        let mut worktrees = Vec::new();
        let mut current = PendingWorktree::default();
        let mut in_block = false;

        for line in output.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                if in_block {
                    worktrees.extend(std::mem::take(&mut current).finish());
                    in_block = false;
                }
                continue;
            }
            in_block = true;

            let (key, value) = match line.split_once(' ') {
                Some((k, v)) => (k, Some(v)),
                None => (line, None),
            };

            match key {
                "worktree" => {
                    // A new `worktree` line without a separating blank line
                    // still starts a new block.
                    if current.path.is_some() {
                        worktrees.extend(std::mem::take(&mut current).finish());
                    }
                    current.path = value.filter(|v| !v.is_empty()).map(PathBuf::from);
                }
                "HEAD" => current.head = value.filter(|v| !v.is_empty()).map(str::to_string),
                "branch" => {
                    current.branch = value.map(|branch_ref| {
                        branch_ref
                            .strip_prefix("refs/heads/")
                            .unwrap_or(branch_ref)
                            .to_string()
                    });
                }
                "bare" => current.bare = true,
                "detached" => current.detached = true,
                "locked" => current.locked = Some(value.unwrap_or_default().to_string()),
                "prunable" => current.prunable = Some(value.unwrap_or_default().to_string()),
                // Unknown attributes from newer git versions
                _ => {}
            }
        }

        if in_block {
            worktrees.extend(current.finish());
        }

        worktrees
    }
}

/// Parse `git rev-list --left-right --count A...B` output: `"<left>\t<right>"`.
pub(crate) fn parse_left_right_counts(output: &str) -> Option<(usize, usize)> {
    let mut parts = output.split_whitespace();
    let left = parts.next()?.parse().ok()?;
    let right = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((left, right))
}

/// Parse `git branch --merged` output into branch names.
///
/// Strips the `* ` (current) and `+ ` (checked out in another worktree)
/// markers and skips `(HEAD detached ...)` entries.
pub(crate) fn parse_branch_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let name = line
                .trim_start_matches(['*', '+'])
                .trim();
            (!name.is_empty() && !name.starts_with('(')).then(|| name.to_string())
        })
        .collect()
}
