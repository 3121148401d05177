mod config;
mod hook;

pub(crate) use config::ConfigCommand;
pub(crate) use hook::HookCommand;

use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{Parser, Subcommand};

/// Custom styles for help output - matches wtm's color scheme
fn help_styles() -> Styles {
    Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON output
    Json,
}

#[derive(Parser)]
#[command(name = "wtm")]
#[command(about = "Git worktree management with derived status and lifecycle hooks", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
#[command(styles = help_styles())]
#[command(arg_required_else_help = true)]
#[command(after_long_help = "\
Getting started

  wtm create feature            # Add a worktree for a new branch
  wtm list                      # Show worktrees with status
  cd \"$(wtm select)\"            # Pick a worktree interactively
  wtm remove feature            # Remove it again")]
pub(crate) struct Cli {
    /// Working directory for this command
    #[arg(
        short = 'C',
        global = true,
        value_name = "path",
        display_order = 100,
        help_heading = "Global Options"
    )]
    pub directory: Option<std::path::PathBuf>,

    /// Config file path
    #[arg(
        long,
        global = true,
        value_name = "path",
        display_order = 101,
        help_heading = "Global Options"
    )]
    pub config: Option<std::path::PathBuf>,

    /// Show debug logging (git commands, timings)
    #[arg(
        long,
        short = 'v',
        global = true,
        action = clap::ArgAction::Count,
        display_order = 102,
        help_heading = "Global Options"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List worktrees with status
    ///
    /// Status is derived on every run: dirty, ahead/behind the comparison
    /// branch, merged, stale, and orphaned (directory gone).
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Create a worktree for a branch
    ///
    /// The worktree is placed according to `paths.strategy`. A missing branch
    /// is created (with the configured prefix) from `--base` or HEAD.
    Create {
        /// Branch name
        branch: String,

        /// Ref to create the branch from
        #[arg(long)]
        base: Option<String>,

        /// Skip the post-create hook
        #[arg(long)]
        no_hooks: bool,
    },

    /// Remove a worktree
    #[command(visible_alias = "rm")]
    Remove {
        /// Worktree name, branch or path (`@` for the current one)
        worktree: String,

        /// Remove even with uncommitted changes or a lock
        #[arg(short, long)]
        force: bool,

        /// Also delete the worktree's branch
        #[arg(short = 'D', long)]
        delete_branch: bool,

        /// Skip the post-delete hook
        #[arg(long)]
        no_hooks: bool,
    },

    /// Rename a worktree's directory
    ///
    /// Moves the worktree next to where it is; the branch is unchanged.
    #[command(visible_alias = "mv")]
    Rename {
        /// Worktree name, branch or path
        worktree: String,

        /// New directory name
        new_name: String,

        /// Skip the post-rename hook
        #[arg(long)]
        no_hooks: bool,
    },

    /// Print a worktree's path, picking one interactively if none is given
    ///
    /// Use with `cd "$(wtm select)"`.
    Select {
        /// Worktree name, branch or path
        worktree: Option<String>,

        /// Skip the post-select hook
        #[arg(long)]
        no_hooks: bool,
    },

    /// Lock a worktree against pruning and removal
    Lock {
        /// Worktree name, branch or path
        worktree: String,

        /// Reason recorded with the lock
        #[arg(long)]
        reason: Option<String>,
    },

    /// Unlock a worktree
    Unlock {
        /// Worktree name, branch or path
        worktree: String,
    },

    /// Print where `create` would place a branch's worktree
    Path {
        /// Branch name
        branch: String,
    },

    /// Run or inspect hooks
    #[command(subcommand)]
    Hook(HookCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print the repository identifier used to key per-repository config
    RepoId,
}
