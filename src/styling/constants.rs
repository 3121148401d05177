//! Style constants and symbols for terminal output
//!
//! # Styling with color-print
//!
//! Use `cformat!` with HTML-like tags for all user-facing messages:
//!
//! ```
//! use color_print::cformat;
//!
//! let name = "feature";
//! let msg = cformat!("<green>Created worktree <bold>{name}</></>");
//!
//! // Semantic mapping:
//! // - Errors: <red>...</>
//! // - Warnings: <yellow>...</>
//! // - Hints: <dim>...</>
//! // - Progress: <cyan>...</>
//! // - Success: <green>...</>
//! // - Secondary: <bright-black>...</>
//! ```
//!
//! # anstyle constants
//!
//! `Style` constants cover the list table and picker, where styles are chosen
//! per cell at runtime.

use std::fmt;

use anstyle::{AnsiColor, Color, Style};
use color_print::{cformat, cstr};

// ============================================================================
// Programmatic Style Constants (tables, picker)
// ============================================================================

/// Uncommitted changes
pub const DIRTY: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Commits ahead of the comparison branch
pub const AHEAD: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));

/// Commits behind the comparison branch
pub const BEHIND: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

/// Merged, stale, orphaned and other de-emphasized markers
pub const MUTED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));

/// Orphaned worktrees (directory gone)
pub const ORPHAN: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Red)))
    .dimmed();

/// The worktree the user is currently in
pub const CURRENT: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Magenta)))
    .bold();

/// Table headers
pub const HEADER: Style = Style::new().bold().underline();

/// Gutter style for quoted content (hook output, git errors)
pub const GUTTER: Style = Style::new().bg_color(Some(Color::Ansi(AnsiColor::BrightWhite)));

// ============================================================================
// Message Symbols
// ============================================================================

/// Progress symbol (cyan ◎)
pub const PROGRESS_SYMBOL: &str = cstr!("<cyan>◎</>");

/// Success symbol (green ✓)
pub const SUCCESS_SYMBOL: &str = cstr!("<green>✓</>");

/// Error symbol (red ✗)
pub const ERROR_SYMBOL: &str = cstr!("<red>✗</>");

/// Warning symbol (yellow ▲)
pub const WARNING_SYMBOL: &str = cstr!("<yellow>▲</>");

/// Hint symbol (dim ↳)
pub const HINT_SYMBOL: &str = cstr!("<dim>↳</>");

/// Info symbol (dim ○)
pub const INFO_SYMBOL: &str = cstr!("<dim>○</>");

// ============================================================================
// Formatted Message Type
// ============================================================================

/// A message that has already been formatted with a symbol and styling.
///
/// Message functions take `impl AsRef<str>` and return `FormattedMessage`.
/// `FormattedMessage` does not implement `AsRef<str>`, so formatting twice is
/// a compile error:
///
/// ```compile_fail
/// use wtm::styling::error_message;
///
/// let msg = error_message("first error");
/// let double = error_message(msg);
/// ```
#[derive(Debug, Clone)]
pub struct FormattedMessage(String);

impl FormattedMessage {
    /// Borrow the inner string for inspection (e.g., in tests).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Message Formatting Functions
// ============================================================================

/// Format an error message with symbol and red styling
///
/// ```
/// use color_print::cformat;
/// use wtm::styling::error_message;
///
/// let name = "feature";
/// println!("{}", error_message(cformat!("No worktree named <bold>{name}</>")));
/// ```
pub fn error_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{ERROR_SYMBOL} <red>{}</>", content.as_ref()))
}

/// Format a hint message with symbol and dim styling
pub fn hint_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{HINT_SYMBOL} <dim>{}</>", content.as_ref()))
}

/// Format a warning message with symbol and yellow styling
pub fn warning_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{WARNING_SYMBOL} <yellow>{}</>", content.as_ref()))
}

/// Format a success message with symbol and green styling
pub fn success_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{SUCCESS_SYMBOL} <green>{}</>", content.as_ref()))
}

/// Format a progress message with symbol and cyan styling
pub fn progress_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{PROGRESS_SYMBOL} <cyan>{}</>", content.as_ref()))
}

/// Format an info message with symbol (no color on text)
pub fn info_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(format!("{INFO_SYMBOL} {}", content.as_ref()))
}

/// Format a section heading (cyan text, optional suffix such as a path)
///
/// ```
/// use wtm::styling::format_heading;
///
/// let h = format_heading("HOOKS", Some("~/.config/wtm/config.json"));
/// assert!(h.contains("HOOKS"));
/// ```
pub fn format_heading(title: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(s) => cformat!("<cyan>{}</>  {}", title, s),
        None => cformat!("<cyan>{}</>", title),
    }
}
