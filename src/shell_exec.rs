//! Process execution
//!
//! Every external command in wtm goes through [`Cmd`], which provides:
//! - captured stdout/stderr (trailing whitespace trimmed)
//! - stdin closed, so interactive children can't hang waiting for input
//! - an optional timeout and an optional [`CancellationToken`]
//! - debug tracing of the command line and its duration
//!
//! Failures never surface as `Err`: a missing binary, a non-zero exit, a timeout
//! or a cancellation all produce a [`CmdOutput`] with `success == false`, so
//! callers branch on one field.
//!
//! Shell commands (hooks) use the platform shell from [`ShellConfig`]:
//! - Unix: `sh -c`
//! - Windows: Git Bash if available, PowerShell otherwise

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use wait_timeout::ChildExt;

/// Exit code reported when the program could not be started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// How often a bounded wait checks for timeout or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Time between the graceful signal and the forced kill.
const KILL_GRACE: Duration = Duration::from_millis(200);

/// How long to keep reading pipes after the child exits. Background
/// grandchildren (`server &`) may hold the pipe open indefinitely.
const PIPE_DRAIN: Duration = Duration::from_millis(250);

#[cfg(unix)]
const SIGTERM: i32 = 15;
const SIGKILL: i32 = 9;

/// Cached shell configuration for the current platform
static SHELL_CONFIG: OnceLock<ShellConfig> = OnceLock::new();

/// Shell configuration for command execution
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Path to the shell executable
    pub executable: PathBuf,
    /// Arguments to pass before the command (e.g., ["-c"] for sh)
    pub args: Vec<String>,
    /// Whether this is a POSIX-compatible shell (bash/sh)
    pub is_posix: bool,
    /// Human-readable name for error messages
    pub name: String,
}

impl ShellConfig {
    /// Get the shell configuration for the current platform
    pub fn get() -> &'static ShellConfig {
        SHELL_CONFIG.get_or_init(detect_shell)
    }
}

fn detect_shell() -> ShellConfig {
    #[cfg(unix)]
    {
        ShellConfig {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string()],
            is_posix: true,
            name: "sh".to_string(),
        }
    }

    #[cfg(windows)]
    {
        if let Some(bash) = find_git_bash() {
            return ShellConfig {
                executable: bash,
                args: vec!["-c".to_string()],
                is_posix: true,
                name: "Git Bash".to_string(),
            };
        }
        ShellConfig {
            executable: PathBuf::from("powershell.exe"),
            args: vec!["-NoProfile".to_string(), "-Command".to_string()],
            is_posix: false,
            name: "PowerShell".to_string(),
        }
    }
}

/// Find Git Bash by deriving its location from `git.exe` in PATH.
///
/// Avoids `which bash`, which often resolves to the WSL launcher.
#[cfg(windows)]
fn find_git_bash() -> Option<PathBuf> {
    let git_path = which::which("git").ok()?;
    let git_dir = git_path.parent()?.parent()?;
    [
        git_dir.join("bin").join("bash.exe"),
        git_dir.join("usr").join("bin").join("bash.exe"),
    ]
    .into_iter()
    .find(|p| p.exists())
}

/// Shared flag that asks in-flight commands to stop.
///
/// Cloning shares the flag. Once cancelled, every [`Cmd`] holding the token
/// terminates its child at the next poll and reports `cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The shared flag, for registering as a signal handler target.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// Result of running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; `128 + signal` when terminated by a signal.
    pub exit_code: i32,
    pub timed_out: bool,
    pub cancelled: bool,
}

impl CmdOutput {
    fn spawn_failure(program: &str, err: &std::io::Error) -> Self {
        let stderr = if err.kind() == std::io::ErrorKind::NotFound {
            format!("{program}: command not found")
        } else {
            format!("{program}: failed to start: {err}")
        };
        Self {
            success: false,
            stdout: String::new(),
            stderr,
            exit_code: SPAWN_FAILURE_EXIT_CODE,
            timed_out: false,
            cancelled: false,
        }
    }

    /// Stderr if non-empty, else stdout. Used for error messages.
    pub fn error_text(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Builder for an external command.
///
/// ```no_run
/// use std::time::Duration;
/// use wtm::shell_exec::Cmd;
///
/// let out = Cmd::new("git")
///     .args(["status", "--porcelain"])
///     .current_dir("/tmp")
///     .run();
/// if out.success {
///     println!("{}", out.stdout);
/// }
///
/// let hook = Cmd::shell("npm install")
///     .env("WT_NAME", "feature")
///     .timeout(Duration::from_secs(30))
///     .run();
/// assert!(hook.success || hook.timed_out || hook.exit_code != 0);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    /// Original command string for shell invocations (for logging)
    shell_command: Option<String>,
    current_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    env_remove: Vec<String>,
    timeout: Option<Duration>,
    cancel: Option<CancellationToken>,
    context: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            shell_command: None,
            current_dir: None,
            env: Vec::new(),
            env_remove: Vec::new(),
            timeout: None,
            cancel: None,
            context: None,
        }
    }

    /// A command string interpreted by the platform shell.
    pub fn shell(command: &str) -> Self {
        let shell = ShellConfig::get();
        let mut cmd = Self::new(shell.executable.to_string_lossy().into_owned());
        cmd.args = shell.args.clone();
        cmd.args.push(command.to_string());
        cmd.shell_command = Some(command.to_string());
        cmd
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Label shown in debug logs, typically the worktree name.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn display_string(&self) -> String {
        if let Some(shell_command) = &self.shell_command {
            return shell_command.clone();
        }
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Run to completion (or timeout/cancellation), with debug tracing.
    pub fn run(&self) -> CmdOutput {
        let cmd_str = self.display_string();
        match &self.context {
            Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
            None => log::debug!("$ {}", cmd_str),
        }

        let t0 = Instant::now();
        let output = self.execute();
        let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

        let ctx = self
            .context
            .as_deref()
            .map(|c| format!("context={c} "))
            .unwrap_or_default();
        if output.timed_out {
            log::debug!("[wtm-trace] {ctx}cmd=\"{cmd_str}\" dur={duration_ms:.1}ms timed_out");
        } else if output.cancelled {
            log::debug!("[wtm-trace] {ctx}cmd=\"{cmd_str}\" dur={duration_ms:.1}ms cancelled");
        } else {
            log::debug!(
                "[wtm-trace] {ctx}cmd=\"{cmd_str}\" dur={duration_ms:.1}ms ok={}",
                output.success
            );
        }

        output
    }

    fn build(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        for key in &self.env_remove {
            command.env_remove(key);
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group so a timeout can signal the whole command tree.
            command.process_group(0);
        }
        command
    }

    fn execute(&self) -> CmdOutput {
        let mut child = match self.build().spawn() {
            Ok(child) => child,
            Err(e) => return CmdOutput::spawn_failure(&self.program, &e),
        };

        let stdout = child.stdout.take().map(PipeReader::spawn);
        let stderr = child.stderr.take().map(PipeReader::spawn);

        let outcome = self.wait(&mut child);

        let stdout = stdout.map(PipeReader::collect).unwrap_or_default();
        let mut stderr = stderr.map(PipeReader::collect).unwrap_or_default();

        match outcome {
            WaitOutcome::Exited(status) => {
                let exit_code = exit_code_of(status);
                CmdOutput {
                    success: status.success(),
                    stdout,
                    stderr,
                    exit_code,
                    timed_out: false,
                    cancelled: false,
                }
            }
            WaitOutcome::TimedOut { signal } | WaitOutcome::Cancelled { signal } => {
                let timed_out = matches!(outcome, WaitOutcome::TimedOut { .. });
                CmdOutput {
                    success: false,
                    stdout,
                    stderr,
                    exit_code: 128 + signal,
                    timed_out,
                    cancelled: !timed_out,
                }
            }
            WaitOutcome::Failed(err) => {
                if !stderr.is_empty() {
                    stderr.push('\n');
                }
                stderr.push_str(&format!("failed to wait for {}: {err}", self.program));
                CmdOutput {
                    success: false,
                    stdout,
                    stderr,
                    exit_code: 1,
                    timed_out: false,
                    cancelled: false,
                }
            }
        }
    }

    fn wait(&self, child: &mut Child) -> WaitOutcome {
        if self.timeout.is_none() && self.cancel.is_none() {
            return match child.wait() {
                Ok(status) => WaitOutcome::Exited(status),
                Err(e) => WaitOutcome::Failed(e),
            };
        }

        let deadline = self.timeout.map(|t| Instant::now() + t);
        loop {
            let slice = match deadline {
                Some(deadline) => deadline
                    .saturating_duration_since(Instant::now())
                    .min(POLL_INTERVAL),
                None => POLL_INTERVAL,
            };
            match child.wait_timeout(slice) {
                Ok(Some(status)) => return WaitOutcome::Exited(status),
                Ok(None) => {}
                Err(e) => return WaitOutcome::Failed(e),
            }
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                let signal = terminate(child);
                return WaitOutcome::Cancelled { signal };
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                let signal = terminate(child);
                return WaitOutcome::TimedOut { signal };
            }
        }
    }
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut { signal: i32 },
    Cancelled { signal: i32 },
    Failed(std::io::Error),
}

fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    if let Some(sig) = std::os::unix::process::ExitStatusExt::signal(&status) {
        return 128 + sig;
    }
    1
}

/// Terminate the child's process group: SIGTERM, then SIGKILL after a grace
/// period. Returns the signal that ended the direct child.
#[cfg(unix)]
fn terminate(child: &mut Child) -> i32 {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(child.id() as i32);
    let _ = killpg(pgid, Signal::SIGTERM);
    let exited_gracefully = matches!(child.wait_timeout(KILL_GRACE), Ok(Some(_)));

    // Grandchildren may ignore SIGTERM even when the shell exits; always finish
    // the group off so nothing keeps our pipes open.
    let _ = killpg(pgid, Signal::SIGKILL);
    if exited_gracefully {
        SIGTERM
    } else {
        let _ = child.kill();
        let _ = child.wait();
        SIGKILL
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> i32 {
    let _ = child.kill();
    let _ = child.wait();
    SIGKILL
}

/// Reads a pipe on a background thread so a bounded wait can't deadlock on a
/// full pipe buffer.
struct PipeReader {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl PipeReader {
    fn spawn<R: Read + Send + 'static>(mut pipe: R) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = crossbeam_channel::bounded(1);
        let sink = Arc::clone(&buf);
        std::thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = tx.send(());
        });
        Self { buf, done }
    }

    fn collect(self) -> String {
        let _ = self.done.recv_timeout(PIPE_DRAIN);
        let bytes = self.buf.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).trim_end().to_string()
    }
}
