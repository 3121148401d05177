//! `wtm list`: every worktree with its derived status.

pub(crate) mod render;

use std::path::Path;

use serde::Serialize;
use wtm::git::{Repository, Worktree};
use wtm::status::{WorktreeStatus, collect_statuses};
use wtm::styling::println;

use super::CommandEnv;
use crate::cli::OutputFormat;

/// One worktree as listed. `status` is `None` until computed (picker only).
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ListItem {
    #[serde(flatten)]
    pub worktree: Worktree,
    /// The worktree containing the base path
    pub is_current: bool,
    pub status: Option<WorktreeStatus>,
}

impl ListItem {
    pub fn new(worktree: Worktree, is_current: bool, status: Option<WorktreeStatus>) -> Self {
        Self {
            worktree,
            is_current,
            status,
        }
    }
}

/// Path of the worktree the command runs in, if any.
pub(crate) fn current_worktree_path(repo: &Repository) -> Option<std::path::PathBuf> {
    repo.worktree_root().ok().map(Path::to_path_buf)
}

pub(crate) fn is_current(worktree: &Worktree, current: Option<&Path>) -> bool {
    current.is_some_and(|current| {
        dunce::canonicalize(&worktree.path).is_ok_and(|path| path == current)
    })
}

pub fn handle_list(format: OutputFormat) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let worktrees = env.repo.list_worktrees()?;
    let opts = env.status_options();
    let statuses = collect_statuses(&env.repo, &worktrees, &opts);
    let current = current_worktree_path(&env.repo);

    let items: Vec<ListItem> = worktrees
        .into_iter()
        .zip(statuses)
        .map(|(wt, status)| {
            let is_current = is_current(&wt, current.as_deref());
            ListItem::new(wt, is_current, Some(status))
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Table => {
            for line in render::render_table(&items, opts.now) {
                println!("{}", line.render());
            }
        }
    }
    Ok(())
}
