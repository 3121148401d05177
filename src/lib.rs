//! Git worktree management with derived status and lifecycle hooks.
//!
//! `wtm` is primarily a CLI. The library exposes the pieces it is built from:
//!
//! - [`shell_exec`]: external commands with timeouts and cancellation
//! - [`git`]: worktree listing, parsing and lifecycle operations
//! - [`status`]: dirty/ahead/behind/merged/stale classification
//! - [`hooks`]: running configured shell hooks
//! - [`config`]: the JSON config file and per-repository resolution
//! - [`path`]: deterministic placement of new worktrees
//!
//! The library API is not stable.

pub mod config;
pub mod git;
pub mod hooks;
pub mod path;
pub mod shell_exec;
pub mod status;
pub mod styling;

// Re-export HookType for convenience
pub use git::HookType;
