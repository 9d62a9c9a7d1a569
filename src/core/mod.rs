//! Core functionality modules
//!
//! The five session operations: adding projects, bids and procurement items,
//! listing projects, and exporting the summary.

pub mod bids;
pub mod exporter;
pub mod presenter;
pub mod procurement;
pub mod projects;

pub use bids::BidOps;
pub use exporter::{ExportArtifact, Exporter};
pub use presenter::{format_money, Presenter, ProjectBlock};
pub use procurement::ProcurementOps;
pub use projects::ProjectOps;
