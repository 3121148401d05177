//! wtm error types and formatting
//!
//! **`GitError`** is a typed enum for domain errors that can be pattern-matched
//! and tested. Use `.into()` to convert to `anyhow::Error` while preserving the
//! type for downcasting. Display produces styled output for users.

use std::path::PathBuf;

use color_print::cformat;

use crate::path::format_path_for_display;
use crate::styling::{error_message, format_with_gutter, hint_message};

/// Domain errors for git and worktree operations.
///
/// ```
/// use wtm::git::GitError;
///
/// let err: anyhow::Error = GitError::WorktreeNotFound { name: "feature".into() }.into();
/// if let Some(GitError::WorktreeNotFound { name }) = err.downcast_ref() {
///     assert_eq!(name, "feature");
/// }
/// ```
#[derive(Debug, Clone)]
pub enum GitError {
    NotInRepository {
        path: PathBuf,
    },
    WorktreeNotFound {
        name: String,
    },
    /// The worktree's directory no longer exists
    WorktreeMissing {
        name: String,
        path: PathBuf,
    },
    WorktreePathExists {
        path: PathBuf,
    },
    WorktreeCreationFailed {
        branch: String,
        base: Option<String>,
        error: String,
    },
    WorktreeRemovalFailed {
        name: String,
        path: PathBuf,
        error: String,
    },
    CannotRemovePrimaryWorktree,
    WorktreeLocked {
        name: String,
        path: PathBuf,
        reason: Option<String>,
    },
    WorktreeMoveFailed {
        name: String,
        to: PathBuf,
        error: String,
    },
    BranchDeletionFailed {
        branch: String,
        error: String,
    },
    /// A command that needs a terminal ran without one
    NotInteractive,
    Other {
        message: String,
    },
}

impl std::error::Error for GitError {}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::NotInRepository { path } => {
                let path_display = format_path_for_display(path);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("Not in a git repository: <bold>{path_display}</>")),
                    hint_message(cformat!(
                        "Run from inside a repository, or pass <bright-black>-C <<path>></>"
                    ))
                )
            }

            GitError::WorktreeNotFound { name } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("No worktree named <bold>{name}</>")),
                hint_message(cformat!("To list worktrees, run <bright-black>wtm list</>"))
            ),

            GitError::WorktreeMissing { name, path } => {
                let path_display = format_path_for_display(path);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!(
                        "Worktree directory missing for <bold>{name}</>: {path_display}"
                    )),
                    hint_message(cformat!(
                        "To clean up, run <bright-black>git worktree prune</>"
                    ))
                )
            }

            GitError::WorktreePathExists { path } => {
                let path_display = format_path_for_display(path);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("Directory already exists: <bold>{path_display}</>")),
                    hint_message("Remove it, or choose a different branch name")
                )
            }

            GitError::WorktreeCreationFailed {
                branch,
                base,
                error,
            } => {
                let header = match base {
                    Some(base) => cformat!(
                        "Failed to create worktree for <bold>{branch}</> from <bold>{base}</>"
                    ),
                    None => cformat!("Failed to create worktree for <bold>{branch}</>"),
                };
                write!(f, "{}", format_error_block(error_message(header), error))
            }

            GitError::WorktreeRemovalFailed { name, path, error } => {
                let path_display = format_path_for_display(path);
                let header = cformat!("Failed to remove worktree <bold>{name}</> @ {path_display}");
                write!(f, "{}", format_error_block(error_message(header), error))?;
                if error.contains("modified or untracked files") {
                    write!(
                        f,
                        "\n{}",
                        hint_message(cformat!(
                            "To discard uncommitted changes, run <bright-black>wtm remove {name} --force</>"
                        ))
                    )?;
                }
                Ok(())
            }

            GitError::CannotRemovePrimaryWorktree => write!(
                f,
                "{}",
                error_message("The primary worktree cannot be removed")
            ),

            GitError::WorktreeLocked { name, path, reason } => {
                let reason_text = match reason.as_deref() {
                    Some(r) if !r.is_empty() => format!(" ({r})"),
                    _ => String::new(),
                };
                let path_display = format_path_for_display(path);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!(
                        "Cannot remove <bold>{name}</>, worktree is locked{reason_text}"
                    )),
                    hint_message(cformat!(
                        "To unlock, run <bright-black>wtm unlock {name}</> (or <bright-black>git worktree unlock {path_display}</>)"
                    ))
                )
            }

            GitError::WorktreeMoveFailed { name, to, error } => {
                let to_display = format_path_for_display(to);
                let header = cformat!("Failed to move worktree <bold>{name}</> to {to_display}");
                write!(f, "{}", format_error_block(error_message(header), error))
            }

            GitError::BranchDeletionFailed { branch, error } => {
                let header = cformat!("Failed to delete branch <bold>{branch}</>");
                write!(f, "{}", format_error_block(error_message(header), error))
            }

            GitError::NotInteractive => write!(
                f,
                "{}\n{}",
                error_message("Interactive picker requires a terminal"),
                hint_message(cformat!(
                    "Pass a worktree name: <bright-black>wtm select <<name>></>"
                ))
            ),

            GitError::Other { message } => write!(f, "{}", error_message(message)),
        }
    }
}

/// Header line followed by the underlying error in a gutter.
fn format_error_block(header: impl std::fmt::Display, error: &str) -> String {
    let trimmed = error.trim();
    if trimmed.is_empty() {
        header.to_string()
    } else {
        format!("{header}\n{}", format_with_gutter(trimmed))
    }
}
