//! bid-desk library
//!
//! Session store, procurement operations and the interactive shell.

pub mod cli;
pub mod core;
pub mod db;
pub mod error;
pub mod session;

// Re-exports for convenience
pub use db::Database;
pub use error::{DeskError, Result};
pub use session::{Command, Outcome, Session};
