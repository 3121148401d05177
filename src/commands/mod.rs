mod config;
mod context;
mod hooks;
mod list;
mod select;
mod worktree;

use crate::cli::{Commands, ConfigCommand, HookCommand};

pub(crate) use context::CommandEnv;

/// Dispatch a parsed command.
pub(crate) fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List { format } => list::handle_list(format),
        Commands::Create {
            branch,
            base,
            no_hooks,
        } => worktree::handle_create(&branch, base.as_deref(), no_hooks),
        Commands::Remove {
            worktree,
            force,
            delete_branch,
            no_hooks,
        } => worktree::handle_remove(&worktree, force, delete_branch, no_hooks),
        Commands::Rename {
            worktree,
            new_name,
            no_hooks,
        } => worktree::handle_rename(&worktree, &new_name, no_hooks),
        Commands::Select { worktree, no_hooks } => {
            select::handle_select(worktree.as_deref(), no_hooks)
        }
        Commands::Lock { worktree, reason } => worktree::handle_lock(&worktree, reason.as_deref()),
        Commands::Unlock { worktree } => worktree::handle_unlock(&worktree),
        Commands::Path { branch } => worktree::handle_path(&branch),
        Commands::Hook(HookCommand::Show { hook_type }) => hooks::handle_hook_show(hook_type),
        Commands::Hook(HookCommand::Run {
            hook_type,
            worktree,
        }) => hooks::handle_hook_run(hook_type, worktree.as_deref()),
        Commands::Config(ConfigCommand::Show { json }) => config::handle_config_show(json),
        Commands::RepoId => config::handle_repo_id(),
    }
}
