//! Consolidated styling module for terminal output.
//!
//! This module uses the anstyle ecosystem:
//! - anstream for auto-detecting color support
//! - anstyle for composable styling
//! - Semantic style constants for worktree status markers
//!
//! ## stdout vs stderr principle
//!
//! - **stdout**: Primary data output (list table, JSON, selected path)
//! - **stderr**: Status messages (progress, success, errors, hints, warnings, hook output)
//!
//! This separation allows `cd "$(wtm select)"` and `wtm list --format json | jq`
//! without status messages interfering.

mod constants;
mod format;
mod line;

// Re-exports from anstream (auto-detecting output)
pub use anstream::{eprintln, println};

pub use constants::*;
pub use format::format_with_gutter;
pub use line::{StyledLine, StyledString};

/// Calculate the visual width of plain text (CJK and emoji count double).
pub fn visual_width(s: &str) -> usize {
    use unicode_width::UnicodeWidthStr;
    s.width()
}
