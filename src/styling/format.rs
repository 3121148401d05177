//! Gutter formatting for quoted content
//!
//! Hook commands and git errors are shown in a gutter so they stand apart from
//! wtm's own messages.

/// Formats text with a gutter (single-space with background color) on each line.
///
/// No trailing newline; the caller separates elements.
///
/// ```
/// use wtm::styling::format_with_gutter;
///
/// eprintln!("{}", format_with_gutter("npm install\nnpm test"));
/// ```
pub fn format_with_gutter(content: &str) -> String {
    let gutter = super::GUTTER;
    content
        .lines()
        .map(|line| format!("{gutter} {gutter:#} {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
