//! Hook configuration types
//!
//! A hook is written in one of three shapes:
//!
//! ```json
//! "post-create": "npm install"
//! "post-create": ["npm install", "npm run build"]
//! "post-create": { "commands": "npm install", "timeoutSeconds": 120, "continueOnError": true }
//! ```
//!
//! [`HookSpec::normalize`] turns any of them into one [`HookCommands`] record,
//! so execution never branches on the shape.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::git::HookType;

/// Per-command timeout when none is configured.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// A hook as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookSpec {
    Single(String),
    List(Vec<String>),
    Detailed(DetailedHook),
}

/// Object form of a hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHook {
    pub commands: CommandList,
    /// Seconds per command; non-positive values fall back to the default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,
}

/// `commands` inside the object form: one string or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandList {
    One(String),
    Many(Vec<String>),
}

impl CommandList {
    fn into_vec(self) -> Vec<String> {
        match self {
            CommandList::One(cmd) => vec![cmd],
            CommandList::Many(cmds) => cmds,
        }
    }
}

/// A hook ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCommands {
    /// At least one non-blank command, in execution order
    pub commands: Vec<String>,
    /// Applies to each command separately
    pub timeout: Duration,
    pub continue_on_error: bool,
}

impl HookSpec {
    /// Normalize to a runnable record.
    ///
    /// Blank commands are dropped; a hook left with no commands is `None` and
    /// does not fire. A non-positive `timeoutSeconds` uses
    /// [`DEFAULT_HOOK_TIMEOUT`].
    pub fn normalize(&self) -> Option<HookCommands> {
        let (commands, timeout_seconds, continue_on_error) = match self.clone() {
            HookSpec::Single(cmd) => (vec![cmd], None, None),
            HookSpec::List(cmds) => (cmds, None, None),
            HookSpec::Detailed(detailed) => (
                detailed.commands.into_vec(),
                detailed.timeout_seconds,
                detailed.continue_on_error,
            ),
        };

        let commands: Vec<String> = commands
            .into_iter()
            .filter(|cmd| !cmd.trim().is_empty())
            .collect();
        if commands.is_empty() {
            return None;
        }

        let timeout = timeout_seconds
            .and_then(|secs| u64::try_from(secs).ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_HOOK_TIMEOUT);

        Some(HookCommands {
            commands,
            timeout,
            continue_on_error: continue_on_error.unwrap_or(false),
        })
    }

    /// The configured `timeoutSeconds` when it will be ignored.
    fn invalid_timeout(&self) -> Option<i64> {
        match self {
            HookSpec::Detailed(DetailedHook {
                timeout_seconds: Some(secs),
                ..
            }) if *secs <= 0 => Some(*secs),
            _ => None,
        }
    }
}

/// Hooks keyed by lifecycle event.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct HooksConfig {
    /// After `wtm create` adds a worktree; runs inside it
    #[serde(
        default,
        rename = "post-create",
        skip_serializing_if = "Option::is_none"
    )]
    pub post_create: Option<HookSpec>,

    /// After `wtm select` resolves a worktree; runs inside it
    #[serde(
        default,
        rename = "post-select",
        skip_serializing_if = "Option::is_none"
    )]
    pub post_select: Option<HookSpec>,

    /// After `wtm remove`; runs in the repository root since the worktree is gone
    #[serde(
        default,
        rename = "post-delete",
        skip_serializing_if = "Option::is_none"
    )]
    pub post_delete: Option<HookSpec>,

    /// After `wtm rename` moves a worktree; runs at the new path
    #[serde(
        default,
        rename = "post-rename",
        skip_serializing_if = "Option::is_none"
    )]
    pub post_rename: Option<HookSpec>,
}

impl HooksConfig {
    pub fn get(&self, hook: HookType) -> Option<&HookSpec> {
        match hook {
            HookType::PostCreate => self.post_create.as_ref(),
            HookType::PostSelect => self.post_select.as_ref(),
            HookType::PostDelete => self.post_delete.as_ref(),
            HookType::PostRename => self.post_rename.as_ref(),
        }
    }

    fn slot_mut(&mut self, hook: HookType) -> &mut Option<HookSpec> {
        match hook {
            HookType::PostCreate => &mut self.post_create,
            HookType::PostSelect => &mut self.post_select,
            HookType::PostDelete => &mut self.post_delete,
            HookType::PostRename => &mut self.post_rename,
        }
    }

    pub fn is_empty(&self) -> bool {
        use strum::IntoEnumIterator;
        HookType::iter().all(|hook| self.get(hook).is_none())
    }

    /// Per hook type, `overrides` wins when it sets that type at all.
    pub fn overridden_by(&self, overrides: &HooksConfig) -> HooksConfig {
        use strum::IntoEnumIterator;
        let mut resolved = self.clone();
        for hook in HookType::iter() {
            if let Some(spec) = overrides.get(hook) {
                *resolved.slot_mut(hook) = Some(spec.clone());
            }
        }
        resolved
    }

    /// Warnings for fields that will fall back to defaults.
    pub(crate) fn collect_warnings(&self, scope: &str, warnings: &mut Vec<String>) {
        use strum::IntoEnumIterator;
        for hook in HookType::iter() {
            if let Some(secs) = self.get(hook).and_then(HookSpec::invalid_timeout) {
                warnings.push(format!(
                    "{scope}hooks.{hook}.timeoutSeconds must be positive (got {secs}); using {}s",
                    DEFAULT_HOOK_TIMEOUT.as_secs()
                ));
            }
        }
    }
}
