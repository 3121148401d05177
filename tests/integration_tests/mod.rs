// Hooks run through `sh -c`; these tests rely on a POSIX shell.
#![cfg(unix)]

pub mod config;
pub mod hooks;
pub mod lifecycle;
pub mod list;
