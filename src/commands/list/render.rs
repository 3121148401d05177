//! Table cells for worktrees, shared by `wtm list` and the picker.

use std::time::Duration;

use wtm::path::format_path_for_display;
use wtm::status::{BaseResolution, Condition, SyncState, WorktreeStatus};
use wtm::styling::{AHEAD, BEHIND, CURRENT, DIRTY, HEADER, MUTED, ORPHAN, StyledLine};

use super::ListItem;

const COLUMN_GAP: usize = 2;
const HEADERS: [&str; 6] = ["", "Name", "Branch", "Status", "Sync", "Age"];

/// Relative age of a commit, e.g. `3days ago`, rounded down to one unit.
pub(crate) fn format_age(last_commit: i64, now: i64) -> String {
    let secs = now.saturating_sub(last_commit);
    if secs < 60 {
        return "now".to_string();
    }
    let secs = secs.unsigned_abs();
    let unit = [86_400, 3_600, 60]
        .into_iter()
        .find(|unit| secs >= *unit)
        .unwrap_or(60);
    let formatted = humantime::format_duration(Duration::from_secs(secs / unit * unit)).to_string();
    let largest = formatted.split_whitespace().next().unwrap_or(&formatted);
    format!("{largest} ago")
}

/// `@` for the current worktree, `^` for the primary one.
pub(crate) fn marker_cell(item: &ListItem) -> StyledLine {
    let mut cell = StyledLine::new();
    if item.is_current {
        cell.push_styled("@", CURRENT);
    } else if item.worktree.is_primary {
        cell.push_styled("^", MUTED);
    }
    cell
}

pub(crate) fn name_cell(item: &ListItem) -> StyledLine {
    let mut cell = StyledLine::new();
    if item.is_current {
        cell.push_styled(&item.worktree.name, CURRENT);
    } else {
        cell.push_raw(&item.worktree.name);
    }
    cell
}

pub(crate) fn branch_cell(item: &ListItem) -> StyledLine {
    let mut cell = StyledLine::new();
    match &item.worktree.branch {
        Some(branch) => cell.push_raw(branch),
        None => {
            let head = item.worktree.head.get(..7).unwrap_or(&item.worktree.head);
            cell.push_styled(format!("({head})"), MUTED);
        }
    }
    cell
}

/// Conditions plus `locked`; `…` while the status is still being computed.
pub(crate) fn status_cell(item: &ListItem) -> StyledLine {
    let mut cell = StyledLine::new();
    let Some(status) = &item.status else {
        cell.push_styled("…", MUTED);
        return cell;
    };

    let mut first = true;
    let mut push = |cell: &mut StyledLine, text: &str, style| {
        if !first {
            cell.push_raw(" ");
        }
        first = false;
        cell.push_styled(text, style);
    };
    for condition in &status.conditions {
        let style = match condition {
            Condition::Dirty => DIRTY,
            Condition::Orphan => ORPHAN,
            Condition::Merged | Condition::Stale => MUTED,
        };
        push(&mut cell, <&'static str>::from(condition), style);
    }
    if item.worktree.is_locked() {
        push(&mut cell, "locked", MUTED);
    }
    cell
}

/// `↑2 ↓1`, `=` when synced, `no base` when nothing to compare against.
pub(crate) fn sync_cell(status: Option<&WorktreeStatus>) -> StyledLine {
    let mut cell = StyledLine::new();
    let Some(status) = status else {
        return cell;
    };
    match (status.sync, status.base) {
        (Some(SyncState::Synced), _) => cell.push_styled("=", MUTED),
        (Some(_), _) => {
            let ahead = status.ahead.unwrap_or(0);
            let behind = status.behind.unwrap_or(0);
            if ahead > 0 {
                cell.push_styled(format!("↑{ahead}"), AHEAD);
            }
            if ahead > 0 && behind > 0 {
                cell.push_raw(" ");
            }
            if behind > 0 {
                cell.push_styled(format!("↓{behind}"), BEHIND);
            }
        }
        (None, Some(BaseResolution::Missing)) => cell.push_styled("no base", MUTED),
        (None, Some(BaseResolution::SelfCompare)) => cell.push_styled("-", MUTED),
        (None, Some(BaseResolution::Resolved)) => cell.push_styled("?", MUTED),
        (None, None) => {}
    }
    cell
}

pub(crate) fn age_cell(status: Option<&WorktreeStatus>, now: i64) -> StyledLine {
    let mut cell = StyledLine::new();
    if let Some(ts) = status.and_then(|s| s.last_commit) {
        cell.push_styled(format_age(ts, now), MUTED);
    }
    cell
}

fn cells(item: &ListItem, now: i64) -> [StyledLine; 6] {
    [
        marker_cell(item),
        name_cell(item),
        branch_cell(item),
        status_cell(item),
        sync_cell(item.status.as_ref()),
        age_cell(item.status.as_ref(), now),
    ]
}

/// Render aligned rows with a header; the path column is last and unpadded.
pub(crate) fn render_table(items: &[ListItem], now: i64) -> Vec<StyledLine> {
    let rows: Vec<_> = items.iter().map(|item| cells(item, now)).collect();

    let mut widths = HEADERS.map(wtm::styling::visual_width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    let mut header = StyledLine::new();
    for (title, width) in HEADERS.iter().zip(widths) {
        let mut cell = StyledLine::new();
        if !title.is_empty() {
            cell.push_styled(*title, HEADER);
        }
        cell.pad_to(width + COLUMN_GAP);
        header.segments.extend(cell.segments);
    }
    header.push_styled("Path", HEADER);
    lines.push(header);

    for (row, item) in rows.into_iter().zip(items) {
        let mut line = StyledLine::new();
        for (mut cell, width) in row.into_iter().zip(widths) {
            cell.pad_to(width + COLUMN_GAP);
            line.segments.extend(cell.segments);
        }
        let path = format_path_for_display(&item.worktree.path);
        if item.worktree.is_orphaned() {
            line.push_styled(path, ORPHAN);
        } else {
            line.push_raw(path);
        }
        lines.push(line);
    }
    lines
}
