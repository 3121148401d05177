use clap::Subcommand;
use wtm::HookType;

/// Run or inspect configured hooks
#[derive(Subcommand)]
pub enum HookCommand {
    /// Show effective hooks
    ///
    /// Lists the hooks that apply to the current repository, after
    /// per-repository overrides.
    Show {
        /// Hook type to show (default: all)
        #[arg(value_enum)]
        hook_type: Option<HookType>,
    },

    /// Fire a hook manually
    ///
    /// Runs the hook with the same environment a lifecycle command would set.
    /// `post-delete` runs in the repository root; the others run in the worktree.
    Run {
        #[arg(value_enum)]
        hook_type: HookType,

        /// Worktree name, branch or path (default: current worktree)
        worktree: Option<String>,
    },
}
