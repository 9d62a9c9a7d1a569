//! Project listing
//!
//! Read-only. Renders every project and its children in store order.

use crate::db::{Database, Project};
use crate::error::{DeskError, Guard, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Closes every project block
pub const BLOCK_SEPARATOR: &str = "---";

/// One rendered project: a heading and the lines below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectBlock {
    pub heading: String,
    pub lines: Vec<String>,
}

impl ProjectBlock {
    pub fn from_project(project: &Project) -> Self {
        let mut lines = vec![
            format!("Description: {}", project.description),
            format!("Start Date: {}", project.start_date),
            format!("End Date: {}", project.end_date),
            "Bids:".to_string(),
        ];

        lines.extend(project.bids.iter().map(|bid| {
            format!(
                "- {}: ${} on {}",
                bid.bidder,
                format_money(bid.amount),
                bid.date
            )
        }));

        lines.push("Procurement Items:".to_string());
        lines.extend(project.procurement_items.iter().map(|item| {
            format!(
                "- {}: {} units at ${} each",
                item.item,
                item.quantity,
                format_money(item.unit_price)
            )
        }));

        lines.push(BLOCK_SEPARATOR.to_string());

        Self {
            heading: project.name.clone(),
            lines,
        }
    }

    /// True if any rendered line is exactly `line`
    pub fn contains_line(&self, line: &str) -> bool {
        self.heading == line || self.lines.iter().any(|l| l == line)
    }
}

impl fmt::Display for ProjectBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Money as a plain decimal that always keeps a fractional digit
///
/// `1000.5` renders as `1000.5`, `12.0` as `12.0`. From 1e16 up the
/// exponent form takes over: `1e+16`, `1.5e+16`.
pub fn format_money(value: f64) -> String {
    if value.is_finite() && value.abs() >= 1e16 {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => match exp.strip_prefix('-') {
                Some(digits) => format!("{}e-{:0>2}", mantissa, digits),
                None => format!("{}e+{:0>2}", mantissa, exp),
            },
            None => formatted,
        };
    }

    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

pub struct Presenter {
    db: Arc<Database>,
}

impl Presenter {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Render every project in store order
    ///
    /// Refuses with `EmptyStore` when there is nothing to show.
    pub async fn list_projects(&self) -> Result<Vec<ProjectBlock>> {
        let projects = self.non_empty_snapshot().await?;
        Ok(projects.iter().map(ProjectBlock::from_project).collect())
    }

    /// The whole store as pretty-printed JSON
    pub async fn render_json(&self) -> Result<String> {
        let projects = self.non_empty_snapshot().await?;
        Ok(serde_json::to_string_pretty(&projects)?)
    }

    async fn non_empty_snapshot(&self) -> Result<Vec<Project>> {
        let projects = self.db.snapshot().await?;
        if projects.is_empty() {
            return Err(DeskError::EmptyStore(Guard::ViewProjects));
        }
        Ok(projects)
    }
}
