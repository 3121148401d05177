//! Picker view state.
//!
//! Rows appear immediately with unknown status; [`PickerState::apply`] fills
//! them in as background updates arrive. [`PickerState::refresh`] swaps in a
//! new listing while keeping what is already known.

use std::collections::HashMap;
use std::path::PathBuf;

use wtm::git::Worktree;
use wtm::status::StatusUpdate;

use crate::commands::list::ListItem;

#[derive(Debug, Default)]
pub(crate) struct PickerState {
    pub items: Vec<ListItem>,
    /// Case-insensitive substring filter on name, branch and path
    pub filter: String,
    /// Index into the filtered rows
    pub cursor: usize,
}

impl PickerState {
    pub fn new(items: Vec<ListItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Record a finished status; updates for worktrees no longer listed are dropped.
    pub fn apply(&mut self, update: StatusUpdate) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.worktree.path == update.path)
        {
            item.status = Some(update.status);
        }
    }

    /// Replace the listing.
    ///
    /// Worktrees that still exist keep their displayed status (the next round
    /// of updates replaces it); new ones start unknown; vanished ones are
    /// dropped. The cursor stays on the same worktree when it survives.
    pub fn refresh(&mut self, worktrees: Vec<(Worktree, bool)>) {
        let selected = self.selected().map(|item| item.worktree.path.clone());
        let mut known: HashMap<PathBuf, _> = self
            .items
            .drain(..)
            .filter_map(|item| item.status.map(|status| (item.worktree.path, status)))
            .collect();

        self.items = worktrees
            .into_iter()
            .map(|(wt, is_current)| {
                let status = known.remove(&wt.path);
                ListItem::new(wt, is_current, status)
            })
            .collect();

        self.cursor = selected
            .and_then(|path| {
                self.visible()
                    .position(|item| item.worktree.path == path)
            })
            .unwrap_or(0);
        self.clamp_cursor();
    }

    fn matches(&self, item: &ListItem) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        let needle = self.filter.to_lowercase();
        let wt = &item.worktree;
        wt.name.to_lowercase().contains(&needle)
            || wt
                .branch
                .as_deref()
                .is_some_and(|b| b.to_lowercase().contains(&needle))
            || wt
                .path
                .to_string_lossy()
                .to_lowercase()
                .contains(&needle)
    }

    /// Rows passing the filter, in listing order.
    pub fn visible(&self) -> impl Iterator<Item = &ListItem> {
        self.items.iter().filter(|item| self.matches(item))
    }

    pub fn selected(&self) -> Option<&ListItem> {
        self.visible().nth(self.cursor)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        self.cursor += 1;
        self.clamp_cursor();
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.cursor = 0;
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.cursor = 0;
    }

    fn clamp_cursor(&mut self) {
        let count = self.visible().count();
        self.cursor = self.cursor.min(count.saturating_sub(1));
    }

    /// Rows whose status has arrived.
    pub fn resolved_count(&self) -> usize {
        self.items.iter().filter(|item| item.status.is_some()).count()
    }
}
