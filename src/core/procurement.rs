// Attaches procurement line items to projects
//
// Same rules as bids: refuse on an empty store, skip quietly on a miss.

use crate::core::projects::attach_target;
use crate::db::{Database, NewProcurementItem, ProjectRef};
use crate::error::{Guard, Result};
use std::sync::Arc;
use tracing::info;

pub struct ProcurementOps {
    db: Arc<Database>,
}

impl ProcurementOps {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a line item to the referenced project
    ///
    /// Returns the new item ID, or `None` when no project matched.
    pub async fn add_procurement_item(
        &self,
        project: &ProjectRef,
        item: NewProcurementItem,
    ) -> Result<Option<i64>> {
        let Some(project_id) =
            attach_target(&self.db, Guard::AddProcurementItem, project).await?
        else {
            return Ok(None);
        };

        let id = self.db.insert_procurement_item(project_id, &item).await?;
        info!(
            project_id,
            item_id = id,
            item = item.item(),
            quantity = item.quantity(),
            "procurement item added"
        );

        Ok(Some(id))
    }
}
