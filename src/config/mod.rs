//! Configuration system for wtm
//!
//! A single JSON file holds personal preferences and hooks; it is not checked
//! into git.
//!
//! # Location
//!
//! `$XDG_CONFIG_HOME/wtm/config.json` (or the platform equivalent), overridden
//! by `--config <file>` or `WTM_CONFIG_PATH`.
//!
//! # Settings
//!
//! - `paths.strategy` / `paths.base` - where new worktrees are placed
//! - `defaults.branchPrefix` - prepended to branches `wtm create` makes
//! - `defaults.staleDays` - age after which a worktree reports `stale`
//! - `defaults.comparisonBranch` - branch status is measured against
//! - `hooks.<hook-type>` - shell commands fired on lifecycle events
//! - `repos.<repoId>` - per-repository overrides of the above
//!
//! # Precedence
//!
//! A per-repository value replaces the global one for that field (and for
//! each hook type independently). Nothing is merged: a repository that sets
//! `post-create` runs only its own commands. [`ResolvedConfig`] applies this.
//!
//! # Validation
//!
//! Problems never abort a command. A file that fails to parse falls back to
//! the default config; an invalid field (an unknown strategy, a non-positive
//! `staleDays` or `timeoutSeconds`) falls back to that field's default. Both
//! produce one warning at load time.

mod hooks;
mod resolved;
mod user;

use serde::{Deserialize, Serialize};

pub use hooks::{
    CommandList, DEFAULT_HOOK_TIMEOUT, DetailedHook, HookCommands, HookSpec, HooksConfig,
};
pub use resolved::ResolvedConfig;
pub use user::{
    DefaultsConfig, PathsConfig, RepoOverride, WtmConfig, config_path, is_config_path_explicit,
    set_config_path,
};

/// Where new worktrees are placed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PathStrategy {
    /// Next to the primary worktree: `<parent>/<repo>.<branch>`
    #[default]
    Sibling,
    /// Under one base directory: `<base>/<repo>/<branch>`
    Centralized,
}
