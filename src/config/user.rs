//! User configuration file
//!
//! Loaded once per invocation and passed by reference; nothing caches it
//! globally. Only the file's location is process-wide, set from `--config`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use serde::{Deserialize, Serialize};

use super::{HooksConfig, PathStrategy};
use crate::status::DEFAULT_STALE_DAYS;
use crate::styling::{eprintln, warning_message};

/// Override for the config file location (set from the CLI `--config` flag).
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Set the config path override (called from CLI --config flag)
pub fn set_config_path(path: PathBuf) {
    CONFIG_PATH.set(path).ok();
}

/// Whether the config path came from `--config` or `WTM_CONFIG_PATH`.
pub fn is_config_path_explicit() -> bool {
    CONFIG_PATH.get().is_some() || std::env::var_os("WTM_CONFIG_PATH").is_some()
}

/// Location of the config file.
///
/// 1. `--config <file>`
/// 2. `WTM_CONFIG_PATH`
/// 3. `<config dir>/wtm/config.json`, where `<config dir>` honors
///    `XDG_CONFIG_HOME` (falling back to `~/.config`) on Linux and macOS and
///    `%APPDATA%` on Windows
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = CONFIG_PATH.get() {
        return Some(path.clone());
    }

    if let Some(path) = std::env::var_os("WTM_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("wtm").join("config.json"))
}

/// Placement settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// `sibling` or `centralized`; read through [`PathsConfig::strategy`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,

    /// Base directory for centralized placement; `~` and `$VARS` are expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

impl PathsConfig {
    /// The configured strategy, or [`PathStrategy::Sibling`] when unset or unknown.
    pub fn strategy(&self) -> PathStrategy {
        self.strategy
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// Global defaults, each overridable per repository except `staleDays`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_prefix: Option<String>,

    /// Read through [`DefaultsConfig::stale_days`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_days: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_branch: Option<String>,
}

impl DefaultsConfig {
    /// Configured threshold, or [`DEFAULT_STALE_DAYS`] when unset or not positive.
    pub fn stale_days(&self) -> u32 {
        self.stale_days
            .and_then(|days| u32::try_from(days).ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_STALE_DAYS)
    }
}

/// Settings for one repository, keyed by its identifier under `repos`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_branch: Option<String>,

    #[serde(default, skip_serializing_if = "HooksConfig::is_empty")]
    pub hooks: HooksConfig,
}

/// The whole config file.
///
/// ```json
/// {
///   "paths": { "strategy": "centralized", "base": "~/worktrees" },
///   "defaults": { "branchPrefix": "me/", "staleDays": 14, "comparisonBranch": "origin/main" },
///   "hooks": { "post-create": "npm install" },
///   "repos": {
///     "github.com-acme-api": { "hooks": { "post-create": ["make deps"] } }
///   }
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WtmConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default, skip_serializing_if = "HooksConfig::is_empty")]
    pub hooks: HooksConfig,

    /// BTreeMap keeps serialization order deterministic
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub repos: BTreeMap<String, RepoOverride>,
}

impl WtmConfig {
    /// Load from [`config_path`], printing any warnings to stderr.
    ///
    /// A missing file is the default config; it only warns when the path was
    /// given explicitly.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            log::debug!("no config directory; using defaults");
            return Self::default();
        };

        let (config, warnings) = if path.exists() {
            Self::load_from_path(&path)
        } else {
            let mut warnings = Vec::new();
            if is_config_path_explicit() {
                warnings.push(format!("Config file not found: {}", path.display()));
            }
            (Self::default(), warnings)
        };

        for warning in &warnings {
            eprintln!("{}", warning_message(warning));
        }
        config
    }

    /// Read and parse a config file, collecting warnings instead of failing.
    pub fn load_from_path(path: &Path) -> (Self, Vec<String>) {
        log::debug!("loading config from {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let (config, mut warnings) = Self::parse(&content);
                for warning in &mut warnings {
                    *warning = format!("{}: {warning}", path.display());
                }
                (config, warnings)
            }
            Err(e) => (
                Self::default(),
                vec![format!(
                    "Failed to read config {}: {e}; using defaults",
                    path.display()
                )],
            ),
        }
    }

    /// Parse config JSON. Never fails: problems become warnings and defaults.
    pub fn parse(content: &str) -> (Self, Vec<String>) {
        if content.trim().is_empty() {
            return (Self::default(), Vec::new());
        }
        match serde_json::from_str::<Self>(content) {
            Ok(config) => {
                let warnings = config.validate();
                (config, warnings)
            }
            Err(e) => (
                Self::default(),
                vec![format!("Invalid config ({e}); using defaults")],
            ),
        }
    }

    /// Fields whose values will be ignored in favor of defaults.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(strategy) = &self.paths.strategy
            && strategy.parse::<PathStrategy>().is_err()
        {
            warnings.push(format!(
                "paths.strategy must be \"sibling\" or \"centralized\" (got \"{strategy}\"); using {}",
                PathStrategy::default()
            ));
        }

        if let Some(days) = self.defaults.stale_days
            && self.defaults.stale_days() as i64 != days
        {
            warnings.push(format!(
                "defaults.staleDays must be a positive number of days (got {days}); using {}",
                DEFAULT_STALE_DAYS
            ));
        }

        self.hooks.collect_warnings("", &mut warnings);
        for (repo_id, repo) in &self.repos {
            repo.hooks
                .collect_warnings(&format!("repos.{repo_id}."), &mut warnings);
        }

        warnings
    }

    /// Per-repository settings, if any.
    pub fn repo(&self, repo_id: &str) -> Option<&RepoOverride> {
        self.repos.get(repo_id)
    }
}
