//! Lifecycle commands: create, remove, rename, lock, unlock, path.

use std::path::{Path, PathBuf};

use anyhow::Context;
use color_print::cformat;
use wtm::HookType;
use wtm::git::{GitError, Repository, Worktree};
use wtm::path::{format_path_for_display, renamed_worktree_path, worktree_path_for};
use wtm::styling::{eprintln, hint_message, println, success_message, warning_message};

use super::CommandEnv;
use super::hooks::{context_for, fire};

/// Branch a `create` for `requested` uses, and whether it must be created.
///
/// An existing local branch is used as written; otherwise the configured
/// prefix is applied.
fn target_branch(env: &CommandEnv, requested: &str) -> (String, bool) {
    if env.repo.local_branch_exists(requested) {
        return (requested.to_string(), false);
    }
    let prefixed = env.resolved.prefixed_branch(requested);
    let exists = env.repo.local_branch_exists(&prefixed);
    (prefixed, !exists)
}

fn placement(env: &CommandEnv, branch: &str) -> anyhow::Result<PathBuf> {
    let primary = env.primary_worktree()?;
    Ok(worktree_path_for(
        &primary,
        branch,
        env.resolved.strategy,
        env.resolved.base.as_deref(),
    ))
}

pub fn handle_path(branch: &str) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let (branch, _) = target_branch(&env, branch);
    println!("{}", placement(&env, &branch)?.display());
    Ok(())
}

pub fn handle_create(requested: &str, base: Option<&str>, no_hooks: bool) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let (branch, create_branch) = target_branch(&env, requested);

    let worktrees = env.repo.list_worktrees()?;
    if let Some(existing) = worktrees
        .iter()
        .find(|wt| wt.branch.as_deref() == Some(branch.as_str()))
    {
        return Err(GitError::Other {
            message: cformat!(
                "Branch <bold>{branch}</> is already checked out at <bold>{}</>",
                format_path_for_display(&existing.path)
            ),
        }
        .into());
    }

    if !create_branch && base.is_some() {
        eprintln!(
            "{}",
            warning_message(cformat!(
                "Branch <bold>{branch}</> already exists; ignoring --base"
            ))
        );
    }

    let path = placement(&env, &branch)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", format_path_for_display(parent)))?;
    }

    let base = if create_branch { base } else { None };
    env.repo.add_worktree(&path, &branch, base, create_branch)?;

    let created = find_by_path(&env, &path)?;
    let verb = if create_branch {
        "Created branch and worktree"
    } else {
        "Created worktree"
    };
    eprintln!(
        "{}",
        success_message(cformat!(
            "{verb} for <bold>{branch}</> @ <bold>{}</>",
            format_path_for_display(&path)
        ))
    );
    // stdout carries the path so `cd "$(wtm create x)"` works
    println!("{}", path.display());

    let ctx = context_for(&env, HookType::PostCreate, &created);
    fire(&env, &ctx, None, no_hooks);
    Ok(())
}

pub fn handle_remove(
    query: &str,
    force: bool,
    delete_branch: bool,
    no_hooks: bool,
) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let wt = env.repo.find_worktree(query)?;
    // The base path may be the worktree being removed: git and the
    // post-delete hook run from the repository root instead.
    let root = env.repository_root()?;
    let root_repo = Repository::at(&root);

    if wt.is_orphaned() && !wt.path.exists() {
        // Nothing on disk to remove; drop git's record of it
        if wt.is_locked() && !force {
            return Err(GitError::WorktreeLocked {
                name: wt.name.clone(),
                path: wt.path.clone(),
                reason: wt.locked.clone(),
            }
            .into());
        }
        if wt.is_locked() {
            root_repo.unlock_worktree(&wt.path)?;
        }
        root_repo.prune_worktrees()?;
    } else {
        root_repo.remove_worktree(&wt, force)?;
    }
    eprintln!(
        "{}",
        success_message(cformat!(
            "Removed worktree <bold>{}</> @ <bold>{}</>",
            wt.name,
            format_path_for_display(&wt.path)
        ))
    );

    if delete_branch {
        match wt.branch.as_deref() {
            Some(branch) => match root_repo.delete_branch(branch, force) {
                Ok(()) => eprintln!(
                    "{}",
                    success_message(cformat!("Deleted branch <bold>{branch}</>"))
                ),
                // The worktree is already gone; report and carry on
                Err(e) => {
                    eprintln!("{e}");
                    if !force {
                        eprintln!(
                            "{}",
                            hint_message(cformat!(
                                "Use <bright-black>wtm remove --force -D</> to delete unmerged branches"
                            ))
                        );
                    }
                }
            },
            None => eprintln!(
                "{}",
                warning_message("Worktree was detached; no branch to delete")
            ),
        }
    }

    let ctx = context_for(&env, HookType::PostDelete, &wt);
    fire(&env, &ctx, Some(&root), no_hooks);
    Ok(())
}

pub fn handle_rename(query: &str, new_name: &str, no_hooks: bool) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let wt = env.repo.find_worktree(query)?;
    if wt.is_primary {
        return Err(GitError::Other {
            message: "Cannot rename the primary worktree".into(),
        }
        .into());
    }
    if wt.is_orphaned() {
        return Err(GitError::WorktreeMissing {
            name: wt.name.clone(),
            path: wt.path.clone(),
        }
        .into());
    }

    let to = renamed_worktree_path(&wt.path, new_name);
    env.repo.move_worktree(&wt, &to)?;
    let moved = find_by_path(&env, &to)?;
    eprintln!(
        "{}",
        success_message(cformat!(
            "Renamed <bold>{}</> to <bold>{}</>",
            wt.name,
            moved.name
        ))
    );

    let ctx = context_for(&env, HookType::PostRename, &moved).renamed_from(wt.name, wt.path);
    fire(&env, &ctx, None, no_hooks);
    Ok(())
}

pub fn handle_lock(query: &str, reason: Option<&str>) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let wt = env.repo.find_worktree(query)?;
    if wt.is_locked() {
        eprintln!(
            "{}",
            warning_message(cformat!("Worktree <bold>{}</> is already locked", wt.name))
        );
        return Ok(());
    }
    env.repo.lock_worktree(&wt.path, reason)?;
    eprintln!(
        "{}",
        success_message(cformat!("Locked worktree <bold>{}</>", wt.name))
    );
    Ok(())
}

pub fn handle_unlock(query: &str) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let wt = env.repo.find_worktree(query)?;
    if !wt.is_locked() {
        eprintln!(
            "{}",
            warning_message(cformat!("Worktree <bold>{}</> is not locked", wt.name))
        );
        return Ok(());
    }
    env.repo.unlock_worktree(&wt.path)?;
    eprintln!(
        "{}",
        success_message(cformat!("Unlocked worktree <bold>{}</>", wt.name))
    );
    Ok(())
}

fn find_by_path(env: &CommandEnv, path: &Path) -> anyhow::Result<Worktree> {
    let query = path.to_string_lossy();
    env.repo.find_worktree(&query)
}
