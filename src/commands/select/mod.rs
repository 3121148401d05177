//! `wtm select`: resolve a worktree, or pick one interactively.
//!
//! The picker draws the listing immediately with unknown status. Statuses are
//! computed on a background thread and streamed over a channel into the
//! input/render loop. `Ctrl-R` re-lists worktrees; quitting cancels any status
//! queries still running.

mod render;
mod state;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use wtm::HookType;
use wtm::git::{GitError, Repository, Worktree};
use wtm::shell_exec::CancellationToken;
use wtm::status::{StatusOptions, StatusUpdate, stream_statuses};
use wtm::styling::{eprintln, info_message, println};

use self::state::PickerState;
use super::CommandEnv;
use super::hooks::{context_for, fire};
use super::list::{ListItem, current_worktree_path, is_current};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn handle_select(query: Option<&str>, no_hooks: bool) -> anyhow::Result<()> {
    let env = CommandEnv::load()?;

    let wt = match query {
        Some(query) => env.repo.find_worktree(query)?,
        None => {
            if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
                return Err(GitError::NotInteractive.into());
            }
            match pick(&env)? {
                Some(wt) => wt,
                None => {
                    eprintln!("{}", info_message("No worktree selected"));
                    return Ok(());
                }
            }
        }
    };

    if wt.is_orphaned() {
        return Err(GitError::WorktreeMissing {
            name: wt.name.clone(),
            path: wt.path.clone(),
        }
        .into());
    }

    log::debug!("selected {}", wt.name);
    println!("{}", wt.path.display());
    let ctx = context_for(&env, HookType::PostSelect, &wt);
    fire(&env, &ctx, None, no_hooks);
    Ok(())
}

/// Worktrees with their "current" flag, from a fresh listing.
fn list_rows(base: &Path) -> anyhow::Result<Vec<(Worktree, bool)>> {
    let repo = Repository::at(base);
    let current = current_worktree_path(&repo);
    Ok(repo
        .list_worktrees()?
        .into_iter()
        .map(|wt| {
            let current = is_current(&wt, current.as_deref());
            (wt, current)
        })
        .collect())
}

/// Background status computation for one listing.
///
/// Dropping the stream cancels it; git commands still running are killed.
struct StatusStream {
    cancel: CancellationToken,
    rx: Receiver<StatusUpdate>,
}

impl StatusStream {
    fn start(base: &Path, worktrees: Vec<Worktree>, opts: StatusOptions) -> Self {
        let cancel = CancellationToken::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let repo = Repository::at(base).with_cancellation(cancel.clone());
        let token = cancel.clone();
        thread::spawn(move || {
            stream_statuses(&repo, &worktrees, &opts, &tx, &token);
            log::debug!("status stream finished");
        });
        Self { cancel, rx }
    }
}

impl Drop for StatusStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Raw mode and the alternate screen on stderr, restored on drop.
///
/// stdout stays clean for the selected path.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stderr(), EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stderr(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Up,
    Down,
    Accept,
    Quit,
    Refresh,
    Type(char),
    Backspace,
}

fn action_for(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('p') if ctrl => Action::Up,
        KeyCode::Char('n') if ctrl => Action::Down,
        KeyCode::Char('r') if ctrl => Action::Refresh,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => Action::Type(c),
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Enter => Action::Accept,
        KeyCode::Esc => Action::Quit,
        KeyCode::Backspace => Action::Backspace,
        _ => return None,
    };
    Some(action)
}

fn draw(out: &mut impl Write, state: &PickerState) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in render::render_frame(state, cols.into(), rows.into())
        .iter()
        .enumerate()
    {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, cursor::MoveTo(0, row), Print(line.render()))?;
    }
    out.flush()
}

/// Run the picker; `None` when the user quits without choosing.
fn pick(env: &CommandEnv) -> anyhow::Result<Option<Worktree>> {
    let base = env.repo.base_path().to_path_buf();
    let mut opts = env.status_options();

    let rows = list_rows(&base)?;
    let mut stream = StatusStream::start(
        &base,
        rows.iter().map(|(wt, _)| wt.clone()).collect(),
        opts.clone(),
    );
    let mut state = PickerState::new(
        rows.into_iter()
            .map(|(wt, current)| ListItem::new(wt, current, None))
            .collect(),
    );

    let _guard = TerminalGuard::enter()?;
    let mut out = io::stderr();
    let mut dirty = true;

    loop {
        for update in stream.rx.try_iter() {
            state.apply(update);
            dirty = true;
        }
        if dirty {
            draw(&mut out, &state)?;
            dirty = false;
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            Event::Resize(..) => {
                dirty = true;
                continue;
            }
            _ => continue,
        };
        let Some(action) = action_for(key) else {
            continue;
        };
        dirty = true;
        match action {
            Action::Up => state.move_up(),
            Action::Down => state.move_down(),
            Action::Type(c) => state.push_filter(c),
            Action::Backspace => state.pop_filter(),
            Action::Quit => return Ok(None),
            Action::Accept => {
                if let Some(item) = state.selected() {
                    return Ok(Some(item.worktree.clone()));
                }
            }
            Action::Refresh => {
                let rows = list_rows(&base)?;
                let worktrees = rows.iter().map(|(wt, _)| wt.clone()).collect();
                // Staleness is judged against the time of the refresh
                opts = opts.refreshed();
                // Replacing the stream cancels the previous round
                stream = StatusStream::start(&base, worktrees, opts.clone());
                state.refresh(rows);
            }
        }
    }
}
