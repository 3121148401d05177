//! Concurrent status collection.
//!
//! Each worktree's status is independent, so queries run on the rayon pool.
//! [`stream_statuses`] sends results as they finish, letting the picker draw
//! the listing first and fill in status cells incrementally.

use std::path::PathBuf;

use crossbeam_channel::Sender;
use rayon::prelude::*;

use super::{StatusOptions, WorktreeStatus, worktree_status};
use crate::git::{Repository, Worktree};
use crate::shell_exec::CancellationToken;

/// One finished status computation.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    /// Worktree path; stable across refreshes, unlike list positions
    pub path: PathBuf,
    pub status: WorktreeStatus,
}

/// Compute every worktree's status in parallel, preserving order.
pub fn collect_statuses(
    repo: &Repository,
    worktrees: &[Worktree],
    opts: &StatusOptions,
) -> Vec<WorktreeStatus> {
    worktrees
        .par_iter()
        .map(|wt| worktree_status(repo, wt, opts))
        .collect()
}

/// Compute statuses in parallel and send each one as soon as it's ready.
///
/// Blocks until all worktrees are done, the token is cancelled, or the
/// receiver hangs up. Worktrees not yet started when cancellation is observed
/// are skipped; in-flight git commands stop if `repo` carries the same token.
pub fn stream_statuses(
    repo: &Repository,
    worktrees: &[Worktree],
    opts: &StatusOptions,
    tx: &Sender<StatusUpdate>,
    cancel: &CancellationToken,
) {
    worktrees.par_iter().for_each(|wt| {
        if cancel.is_cancelled() {
            return;
        }
        let status = worktree_status(repo, wt, opts);
        if cancel.is_cancelled() {
            return;
        }
        if tx
            .send(StatusUpdate {
                path: wt.path.clone(),
                status,
            })
            .is_err()
        {
            log::debug!("status receiver closed; dropping {}", wt.name);
        }
    });
}
