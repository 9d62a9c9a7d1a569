//! Summary export
//!
//! One CSV row per project with its bid and line item counts. No money is
//! added up here.

use crate::db::{Database, ProjectSummary};
use crate::error::{DeskError, Guard, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// File name the download is offered under
pub const EXPORT_FILE_NAME: &str = "project_data.csv";

/// MIME type of the download
pub const EXPORT_MIME: &str = "text/csv";

const HEADER: [&str; 6] = [
    "Project Name",
    "Description",
    "Start Date",
    "End Date",
    "Number of Bids",
    "Number of Procurement Items",
];

/// A named, downloadable file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Deliver the download into `dir`, replacing any earlier export
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;

        Ok(path)
    }

    /// The contents as text; exports are always UTF-8
    pub fn as_text(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| DeskError::Generic(format!("export is not UTF-8: {}", e)))
    }
}

pub struct Exporter {
    db: Arc<Database>,
}

impl Exporter {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Build `project_data.csv` from the current store
    ///
    /// Refuses with `EmptyStore` when there are no projects.
    pub async fn export_summary(&self) -> Result<ExportArtifact> {
        let summaries = self.db.project_summaries().await?;
        if summaries.is_empty() {
            return Err(DeskError::EmptyStore(Guard::Export));
        }

        let csv = render_csv(&summaries);
        info!(rows = summaries.len(), bytes = csv.len(), "summary exported");

        Ok(ExportArtifact {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime: EXPORT_MIME.to_string(),
            bytes: csv.into_bytes(),
        })
    }
}

fn render_csv(summaries: &[ProjectSummary]) -> String {
    let mut out = String::new();
    push_record(&mut out, HEADER.iter().map(|h| h.to_string()));

    for summary in summaries {
        push_record(
            &mut out,
            [
                summary.name.clone(),
                summary.description.clone(),
                summary.start_date.to_string(),
                summary.end_date.to_string(),
                summary.bid_count.to_string(),
                summary.item_count.to_string(),
            ],
        );
    }

    out
}

fn push_record<I: IntoIterator<Item = String>>(out: &mut String, fields: I) {
    let line = fields
        .into_iter()
        .map(|field| escape_field(&field))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

// Quote only when the field would otherwise break the row
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
