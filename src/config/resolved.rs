//! Resolved configuration for one repository.
//!
//! `ResolvedConfig` applies per-repository overrides and defaults, so callers
//! read `resolved.stale_days` instead of repeating the fallback logic.

use serde::Serialize;

use super::{HookCommands, HooksConfig, PathStrategy, WtmConfig};
use crate::git::HookType;

/// Effective settings for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub strategy: PathStrategy,
    /// Centralized base directory, unexpanded
    pub base: Option<String>,
    pub branch_prefix: Option<String>,
    pub comparison_branch: Option<String>,
    pub stale_days: u32,
    pub hooks: HooksConfig,
}

impl ResolvedConfig {
    /// Resolve settings for `repo_id` (global settings when `None`).
    ///
    /// Each overridable field, and each hook type, takes the repository's
    /// value when it sets one and the global value otherwise. Hook command
    /// lists are never concatenated.
    pub fn for_repo(config: &WtmConfig, repo_id: Option<&str>) -> Self {
        let repo = repo_id.and_then(|id| config.repo(id));
        if let Some(id) = repo_id {
            log::debug!(
                "resolving config for {id} ({})",
                if repo.is_some() { "override" } else { "global" }
            );
        }

        let pick = |global: &Option<String>, over: Option<&Option<String>>| {
            over.and_then(Option::clone).or_else(|| global.clone())
        };

        Self {
            strategy: config.paths.strategy(),
            base: pick(&config.paths.base, repo.map(|r| &r.base)),
            branch_prefix: pick(
                &config.defaults.branch_prefix,
                repo.map(|r| &r.branch_prefix),
            ),
            comparison_branch: pick(
                &config.defaults.comparison_branch,
                repo.map(|r| &r.comparison_branch),
            ),
            stale_days: config.defaults.stale_days(),
            hooks: match repo {
                Some(repo) => config.hooks.overridden_by(&repo.hooks),
                None => config.hooks.clone(),
            },
        }
    }

    /// The runnable hook for `hook`, if configured and non-empty.
    pub fn hook(&self, hook: HookType) -> Option<HookCommands> {
        self.hooks.get(hook).and_then(|spec| spec.normalize())
    }

    /// `branch` with the configured prefix, unless it already carries it.
    pub fn prefixed_branch(&self, branch: &str) -> String {
        match self.branch_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() && !branch.starts_with(prefix) => {
                format!("{prefix}{branch}")
            }
            _ => branch.to_string(),
        }
    }
}
