//! Session layer
//!
//! Command dispatch over a session-owned store, plus the interactive shell
//! that feeds it.

pub mod dispatcher;
pub mod repl;

pub use dispatcher::{Command, MenuChoice, Outcome, Session};
pub use repl::{Input, Prompter, Repl, ShellCommand};
