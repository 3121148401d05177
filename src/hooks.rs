//! Lifecycle hook execution.
//!
//! Hooks are user shell commands fired after `create`, `select`, `remove` and
//! `rename`. They run strictly in order, each through the platform shell with
//! a timeout, and describe the event through `WT_*` environment variables.
//!
//! A hook never fails the operation that fired it: failures become warnings
//! and the runner returns a [`HookReport`] rather than an error.

use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(unix)]
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use color_print::cformat;

use crate::config::HookCommands;
use crate::git::{HookType, Worktree};
use crate::shell_exec::{CancellationToken, Cmd, CmdOutput};
use crate::styling::{eprintln, hint_message, progress_message, warning_message};

/// The event a hook describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookContext {
    pub hook_type: HookType,
    pub name: String,
    pub path: PathBuf,
    /// `None` when detached; exported as an empty string
    pub branch: Option<String>,
    pub repo_id: String,
    /// Rename only: name and path before the move
    pub old_name: Option<String>,
    pub old_path: Option<PathBuf>,
}

impl HookContext {
    pub fn new(hook_type: HookType, worktree: &Worktree, repo_id: impl Into<String>) -> Self {
        Self {
            hook_type,
            name: worktree.name.clone(),
            path: worktree.path.clone(),
            branch: worktree.branch.clone(),
            repo_id: repo_id.into(),
            old_name: None,
            old_path: None,
        }
    }

    /// Record where a renamed worktree used to be.
    pub fn renamed_from(mut self, old_name: impl Into<String>, old_path: impl Into<PathBuf>) -> Self {
        self.old_name = Some(old_name.into());
        self.old_path = Some(old_path.into());
        self
    }

    /// Variables added to the process environment for each command.
    ///
    /// `WT_OLD_NAME` and `WT_OLD_PATH` are only present for renames.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            ("WT_NAME", self.name.clone()),
            ("WT_PATH", self.path.to_string_lossy().into_owned()),
            ("WT_BRANCH", self.branch.clone().unwrap_or_default()),
            ("WT_REPO_ID", self.repo_id.clone()),
            ("WT_HOOK", self.hook_type.to_string()),
        ];
        if let Some(old_name) = &self.old_name {
            vars.push(("WT_OLD_NAME", old_name.clone()));
        }
        if let Some(old_path) = &self.old_path {
            vars.push(("WT_OLD_PATH", old_path.to_string_lossy().into_owned()));
        }
        vars
    }
}

/// How one hook command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CommandStatus {
    Succeeded,
    /// Non-zero exit, including spawn failure (127)
    Failed { exit_code: i32 },
    TimedOut,
    Cancelled,
    /// Not run because an earlier command failed or the run was cancelled
    Skipped,
}

/// Outcome of one configured command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: String,
    pub status: CommandStatus,
}

/// Per-command outcomes of one hook run, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl HookReport {
    /// Every configured command ran and succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status == CommandStatus::Succeeded)
    }

    pub fn ran(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != CommandStatus::Skipped)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes.iter().filter(|o| {
            !matches!(o.status, CommandStatus::Succeeded | CommandStatus::Skipped)
        })
    }
}

/// Runs hook commands sequentially.
#[derive(Debug, Clone, Default)]
pub struct HookRunner {
    cancel: CancellationToken,
}

impl HookRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a token; cancelling it stops the running command and skips the rest.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Run `hook` for `ctx`.
    ///
    /// Commands run in `cwd` when given (post-delete passes the repository
    /// root, since the worktree is gone) and in the worktree otherwise. Each
    /// line of output is echoed to stderr as `[<hook-type>] <line>`. A failure
    /// is a warning; unless `continue_on_error` is set it also skips the
    /// remaining commands. SIGINT while a command runs cancels it.
    pub fn run(&self, hook: &HookCommands, ctx: &HookContext, cwd: Option<&Path>) -> HookReport {
        let dir = cwd.unwrap_or(&ctx.path);
        let env = ctx.env_vars();
        let _interrupt = InterruptGuard::register(&self.cancel);

        let mut report = HookReport::default();
        let mut stopped = false;

        for command in &hook.commands {
            if stopped || self.cancel.is_cancelled() {
                report.outcomes.push(CommandOutcome {
                    command: command.clone(),
                    status: CommandStatus::Skipped,
                });
                continue;
            }

            eprintln!(
                "{}",
                progress_message(cformat!(
                    "Running {} hook: <bold>{command}</>",
                    ctx.hook_type
                ))
            );

            let output = Cmd::shell(command)
                .current_dir(dir)
                .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
                .timeout(hook.timeout)
                .cancel_token(self.cancel.clone())
                .context(ctx.name.clone())
                .run();

            print_prefixed(ctx.hook_type, &output);
            let status = status_of(&output);

            if status != CommandStatus::Succeeded {
                eprintln!(
                    "{}",
                    warning_message(failure_text(ctx.hook_type, command, status, hook))
                );
                if !hook.continue_on_error || status == CommandStatus::Cancelled {
                    stopped = true;
                }
            }

            report.outcomes.push(CommandOutcome {
                command: command.clone(),
                status,
            });
        }

        let skipped = report
            .outcomes
            .iter()
            .filter(|o| o.status == CommandStatus::Skipped)
            .count();
        if skipped > 0 {
            let noun = if skipped == 1 { "command" } else { "commands" };
            eprintln!(
                "{}",
                hint_message(format!(
                    "Skipped {skipped} remaining {} {noun}",
                    ctx.hook_type
                ))
            );
        }

        report
    }
}

fn status_of(output: &CmdOutput) -> CommandStatus {
    if output.success {
        CommandStatus::Succeeded
    } else if output.timed_out {
        CommandStatus::TimedOut
    } else if output.cancelled {
        CommandStatus::Cancelled
    } else {
        CommandStatus::Failed {
            exit_code: output.exit_code,
        }
    }
}

fn failure_text(hook_type: HookType, command: &str, status: CommandStatus, hook: &HookCommands) -> String {
    match status {
        CommandStatus::TimedOut => cformat!(
            "{hook_type} command timed out after {}s: <bold>{command}</>",
            hook.timeout.as_secs()
        ),
        CommandStatus::Cancelled => cformat!("{hook_type} command interrupted: <bold>{command}</>"),
        CommandStatus::Failed { exit_code } => {
            cformat!("{hook_type} command failed (exit {exit_code}): <bold>{command}</>")
        }
        CommandStatus::Succeeded | CommandStatus::Skipped => String::new(),
    }
}

/// Echo captured output to stderr, one prefixed line at a time.
fn print_prefixed(hook_type: HookType, output: &CmdOutput) {
    for line in output.stdout.lines().chain(output.stderr.lines()) {
        eprintln!("{}", cformat!("<dim>[{hook_type}]</> {line}"));
    }
}

/// Routes SIGINT into a cancellation token for as long as it lives.
///
/// While registered, Ctrl-C no longer terminates wtm itself: the running hook
/// command is stopped and the lifecycle operation finishes normally. Once the
/// last guard drops, SIGINT takes its default action again.
struct InterruptGuard {
    #[cfg(unix)]
    id: Option<signal_hook::SigId>,
}

/// Process-wide SIGINT fallback: terminate unless a guard is active.
#[cfg(unix)]
struct InterruptDefault {
    active: Mutex<usize>,
    terminate: Arc<AtomicBool>,
}

#[cfg(unix)]
fn interrupt_default() -> &'static InterruptDefault {
    static STATE: OnceLock<InterruptDefault> = OnceLock::new();
    STATE.get_or_init(|| {
        let terminate = Arc::new(AtomicBool::new(true));
        // Stays registered; unregistering a handler would leave SIGINT ignored
        if let Err(e) = signal_hook::flag::register_conditional_default(
            signal_hook::consts::SIGINT,
            Arc::clone(&terminate),
        ) {
            log::debug!("failed to register default SIGINT handler: {e}");
        }
        InterruptDefault {
            active: Mutex::new(0),
            terminate,
        }
    })
}

impl InterruptGuard {
    #[cfg(unix)]
    fn register(cancel: &CancellationToken) -> Self {
        let state = interrupt_default();
        {
            let mut active = state.active.lock().unwrap_or_else(PoisonError::into_inner);
            *active += 1;
            state.terminate.store(false, Ordering::SeqCst);
        }
        let id = signal_hook::flag::register(signal_hook::consts::SIGINT, cancel.flag())
            .inspect_err(|e| log::debug!("failed to register SIGINT handler: {e}"))
            .ok();
        Self { id }
    }

    #[cfg(not(unix))]
    fn register(_cancel: &CancellationToken) -> Self {
        Self {}
    }
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            signal_hook::low_level::unregister(id);
        }
        let state = interrupt_default();
        let mut active = state.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active = active.saturating_sub(1);
        if *active == 0 {
            state.terminate.store(true, Ordering::SeqCst);
        }
    }
}
