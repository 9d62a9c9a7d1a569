//! Data models for store entities
//!
//! Row types map to tables through sqlx. `Project` is the assembled view with
//! its bids and line items loaded.

use crate::error::{DeskError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A procurement project with its children in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bids: Vec<Bid>,
    pub procurement_items: Vec<ProcurementItem>,
}

impl Project {
    pub(crate) fn from_row(
        row: ProjectRow,
        bids: Vec<Bid>,
        procurement_items: Vec<ProcurementItem>,
    ) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            bids,
            procurement_items,
        }
    }
}

/// A row of the projects table
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// An offer attached to exactly one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bid {
    pub id: i64,
    pub project_id: i64,
    pub bidder: String,
    pub amount: f64,
    #[sqlx(rename = "bid_date")]
    pub date: NaiveDate,
}

/// A good or service line attached to exactly one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProcurementItem {
    pub id: i64,
    pub project_id: i64,
    pub item: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// One export row: a project and how many children it has
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProjectSummary {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bid_count: i64,
    pub item_count: i64,
}

/// How a form points at a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    /// Exact project, picked from the listed projects
    Id(i64),
    /// First project in store order with this exact name
    Name(String),
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRef::Id(id) => write!(f, "#{}", id),
            ProjectRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Input for a new project. Stored exactly as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Input for a new bid
///
/// Built through [`NewBid::new`] so the amount is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBid {
    bidder: String,
    amount: f64,
    date: NaiveDate,
}

impl NewBid {
    pub fn new(bidder: impl Into<String>, amount: f64, date: NaiveDate) -> Result<Self> {
        ensure_money("bid amount", amount)?;
        Ok(Self {
            bidder: bidder.into(),
            amount,
            date,
        })
    }

    pub fn bidder(&self) -> &str {
        &self.bidder
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Input for a new procurement line item
///
/// Built through [`NewProcurementItem::new`]: quantity at least 1, unit price
/// never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProcurementItem {
    item: String,
    quantity: u32,
    unit_price: f64,
}

impl NewProcurementItem {
    pub fn new(item: impl Into<String>, quantity: u32, unit_price: f64) -> Result<Self> {
        if quantity < 1 {
            return Err(DeskError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }
        ensure_money("unit price", unit_price)?;

        Ok(Self {
            item: item.into(),
            quantity,
            unit_price,
        })
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }
}

fn ensure_money(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DeskError::InvalidInput(format!(
            "{} must be a number of at least 0",
            field
        )));
    }
    Ok(())
}
