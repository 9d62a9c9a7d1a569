//! Session store module for bid-desk
//!
//! Holds every project of the current session in a private in-memory
//! SQLite database driven through sqlx.

pub mod connection;
pub mod models;
pub mod queries;

pub use connection::{Database, StoreStats};
pub use models::*;
