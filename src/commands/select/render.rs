//! Picker frame layout.

use anstyle::Style;
use wtm::path::format_path_for_display;
use wtm::styling::{CURRENT, MUTED, StyledLine};

use super::state::PickerState;
use crate::commands::list::render::{branch_cell, name_cell, status_cell, sync_cell};

const CURSOR: &str = "› ";
const SELECTED: Style = Style::new().bold();

/// Lines for one frame, at most `height` long and `width` wide.
///
/// Line 1 is the filter prompt with progress; the rest are rows, scrolled so
/// the cursor stays visible.
pub(crate) fn render_frame(state: &PickerState, width: usize, height: usize) -> Vec<StyledLine> {
    let mut lines = Vec::new();

    let mut prompt = StyledLine::new();
    prompt.push_styled("> ", CURRENT);
    prompt.push_raw(&state.filter);
    let total = state.items.len();
    let resolved = state.resolved_count();
    if resolved < total {
        prompt.push_styled(format!("  (status {resolved}/{total})"), MUTED);
    }
    lines.push(prompt.truncate_to_width(width));

    let visible: Vec<_> = state.visible().collect();
    if visible.is_empty() {
        let mut empty = StyledLine::new();
        empty.push_styled("  no matching worktrees", MUTED);
        lines.push(empty);
        return lines;
    }

    let name_width = visible
        .iter()
        .map(|item| name_cell(item).width())
        .max()
        .unwrap_or(0);
    let branch_width = visible
        .iter()
        .map(|item| branch_cell(item).width())
        .max()
        .unwrap_or(0);

    let rows = height.saturating_sub(1).max(1);
    let offset = state.cursor.saturating_sub(rows - 1);

    for (index, item) in visible.iter().enumerate().skip(offset).take(rows) {
        let mut line = StyledLine::new();
        if index == state.cursor {
            line.push_styled(CURSOR, SELECTED);
        } else {
            line.push_raw("  ");
        }

        let mut name = name_cell(item);
        name.pad_to(name_width + 2);
        let mut branch = branch_cell(item);
        branch.pad_to(branch_width + 2);
        let mut status = status_cell(item);
        let sync = sync_cell(item.status.as_ref());
        if sync.width() > 0 {
            status.push_raw(" ");
            status.segments.extend(sync.segments);
        }
        status.push_raw("  ");

        for cell in [name, branch, status] {
            line.segments.extend(cell.segments);
        }
        line.push_styled(format_path_for_display(&item.worktree.path), MUTED);
        lines.push(line.truncate_to_width(width));
    }
    lines
}
