use std::path::Path;

use color_print::cformat;
use strum::IntoEnumIterator;
use wtm::HookType;
use wtm::git::Worktree;
use wtm::hooks::{HookContext, HookReport, HookRunner};
use wtm::styling::{eprintln, format_heading, format_with_gutter, info_message, println};

use super::CommandEnv;

/// Fire `hook_type` for a lifecycle command, if configured.
///
/// Returns `None` when nothing ran. Failures have already been reported as
/// warnings; the calling command still succeeds.
pub(super) fn fire(
    env: &CommandEnv,
    ctx: &HookContext,
    cwd: Option<&Path>,
    skip: bool,
) -> Option<HookReport> {
    if skip {
        log::debug!("{} skipped (--no-hooks)", ctx.hook_type);
        return None;
    }
    let hook = env.resolved.hook(ctx.hook_type)?;
    Some(HookRunner::new().run(&hook, ctx, cwd))
}

pub fn handle_hook_run(hook_type: HookType, worktree: Option<&str>) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let wt = env.repo.find_worktree(worktree.unwrap_or("@"))?;

    let Some(hook) = env.resolved.hook(hook_type) else {
        eprintln!(
            "{}",
            info_message(cformat!("No <bold>{hook_type}</> hook configured"))
        );
        return Ok(());
    };

    let ctx = HookContext::new(hook_type, &wt, env.repo_id.clone());
    let cwd = match hook_type {
        HookType::PostDelete => Some(env.repository_root()?),
        _ => None,
    };
    HookRunner::new().run(&hook, &ctx, cwd.as_deref());
    Ok(())
}

pub fn handle_hook_show(hook_type: Option<HookType>) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;
    let overrides = env.config.repo(&env.repo_id).map(|r| &r.hooks);

    for hook in HookType::iter().filter(|h| hook_type.is_none_or(|wanted| wanted == *h)) {
        let source = if overrides.is_some_and(|o| o.get(hook).is_some()) {
            format!("repos.{}", env.repo_id)
        } else {
            "global".to_string()
        };

        match env.resolved.hook(hook) {
            Some(commands) => {
                let mut suffix = format!("{source}, timeout {}s", commands.timeout.as_secs());
                if commands.continue_on_error {
                    suffix.push_str(", continue on error");
                }
                println!("{}", format_heading(&hook.to_string(), Some(&suffix)));
                println!("{}", format_with_gutter(&commands.commands.join("\n")));
            }
            None => {
                println!("{}", format_heading(&hook.to_string(), None));
                println!("{}", cformat!("<dim>(none)</>"));
            }
        }
    }
    Ok(())
}

/// Context for a worktree that is about to disappear or has just moved.
pub(super) fn context_for(env: &CommandEnv, hook_type: HookType, wt: &Worktree) -> HookContext {
    HookContext::new(hook_type, wt, env.repo_id.clone())
}
