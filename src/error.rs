//! Error types for bid-desk
//!
//! Every failure the session can hit. Uses thiserror for ergonomic error handling.

use std::fmt;
use thiserror::Error;

/// Operations refused while the store holds no projects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    AddBid,
    AddProcurementItem,
    ViewProjects,
    Export,
}

impl Guard {
    /// Warning shown to the user when the guard trips
    pub fn warning(&self) -> &'static str {
        match self {
            Guard::AddBid | Guard::AddProcurementItem => {
                "No projects available. Please add a project first."
            }
            Guard::ViewProjects => "No projects available.",
            Guard::Export => "No projects available to download.",
        }
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Guard::AddBid => "add bid",
            Guard::AddProcurementItem => "add procurement item",
            Guard::ViewProjects => "view projects",
            Guard::Export => "export",
        };
        write!(f, "{}", s)
    }
}

/// Main error type for bid-desk operations
#[derive(Error, Debug)]
pub enum DeskError {
    /// Session store errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (writing the export, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Terminal input errors
    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// The store is empty and the operation needs at least one project
    #[error("Cannot {0}: the store has no projects")]
    EmptyStore(Guard),

    /// A form value broke its input constraint
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for bid-desk operations
pub type Result<T> = std::result::Result<T, DeskError>;

/// Convert DeskError to a user-friendly error message
impl DeskError {
    pub fn user_message(&self) -> String {
        match self {
            DeskError::Database(e) => {
                format!("Session store error. Please try again. Details: {}", e)
            }
            DeskError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            DeskError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            DeskError::Readline(e) => {
                format!("Could not read from the terminal. Details: {}", e)
            }
            DeskError::EmptyStore(guard) => guard.warning().to_string(),
            DeskError::InvalidInput(reason) => reason.clone(),
            DeskError::Generic(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_messages() {
        let err = DeskError::EmptyStore(Guard::AddBid);
        assert_eq!(
            err.user_message(),
            "No projects available. Please add a project first."
        );

        let err = DeskError::EmptyStore(Guard::Export);
        assert_eq!(err.user_message(), "No projects available to download.");
    }

    #[test]
    fn test_error_display() {
        let err = DeskError::InvalidInput("quantity must be at least 1".to_string());
        let display = format!("{}", err);
        assert!(display.contains("Invalid input"));

        let err = DeskError::EmptyStore(Guard::ViewProjects);
        assert!(err.to_string().contains("view projects"));
    }
}
