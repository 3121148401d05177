//! `wtm config show` and `wtm repo-id`.

use color_print::cformat;
use serde::Serialize;
use strum::IntoEnumIterator;
use wtm::HookType;
use wtm::config::{ResolvedConfig, config_path};
use wtm::path::format_path_for_display;
use wtm::styling::{format_heading, hint_message, println};

use super::CommandEnv;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigReport<'a> {
    config_path: Option<String>,
    config_exists: bool,
    repo_id: &'a str,
    has_override: bool,
    resolved: &'a ResolvedConfig,
}

fn or_unset(value: Option<&str>) -> String {
    value.map_or_else(|| cformat!("<dim>(unset)</>"), str::to_string)
}

pub fn handle_config_show(json: bool) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let path = config_path();
    let exists = path.as_deref().is_some_and(|p| p.is_file());
    let has_override = env.config.repo(&env.repo_id).is_some();

    if json {
        let report = ConfigReport {
            config_path: path.as_ref().map(|p| p.display().to_string()),
            config_exists: exists,
            repo_id: &env.repo_id,
            has_override,
            resolved: &env.resolved,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let location = match &path {
        Some(p) if exists => format_path_for_display(p),
        Some(p) => format!("{} (not found)", format_path_for_display(p)),
        None => "(no config directory)".to_string(),
    };
    println!("{}", format_heading("Config", Some(&location)));
    let source = if has_override {
        "repos override"
    } else {
        "global"
    };
    println!(
        "{}",
        format_heading("Repository", Some(&format!("{}, {source}", env.repo_id)))
    );

    let resolved = &env.resolved;
    let settings = [
        ("paths.strategy", resolved.strategy.to_string()),
        ("paths.base", or_unset(resolved.base.as_deref())),
        ("branchPrefix", or_unset(resolved.branch_prefix.as_deref())),
        (
            "comparisonBranch",
            or_unset(resolved.comparison_branch.as_deref()),
        ),
        ("staleDays", resolved.stale_days.to_string()),
    ];
    for (key, value) in settings {
        println!("  {}", cformat!("<bold>{key:<17}</> {value}"));
    }
    let configured: Vec<String> = HookType::iter()
        .filter(|hook| resolved.hook(*hook).is_some())
        .map(|hook| hook.to_string())
        .collect();
    let hooks = if configured.is_empty() {
        cformat!("<dim>(none)</>")
    } else {
        configured.join(", ")
    };
    println!("  {}", cformat!("<bold>{:<17}</> {hooks}", "hooks"));

    if !exists {
        println!(
            "{}",
            hint_message(cformat!(
                "Create the file or pass <bright-black>--config <<file>></> to customize"
            ))
        );
    }
    Ok(())
}

pub fn handle_repo_id() -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    println!("{}", env.repo_id);
    Ok(())
}
