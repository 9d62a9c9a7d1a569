// Attaches bids to projects
//
// Refuses on an empty store, silently skips when the project can't be found.

use crate::core::projects::attach_target;
use crate::db::{Database, NewBid, ProjectRef};
use crate::error::{Guard, Result};
use std::sync::Arc;
use tracing::info;

pub struct BidOps {
    db: Arc<Database>,
}

impl BidOps {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a bid to the referenced project
    ///
    /// # Returns
    /// * `Ok(Some(id))` - The new bid ID
    /// * `Ok(None)` - No project matched; nothing was written
    /// * `Err(DeskError::EmptyStore)` - There are no projects at all
    pub async fn add_bid(&self, project: &ProjectRef, bid: NewBid) -> Result<Option<i64>> {
        let Some(project_id) = attach_target(&self.db, Guard::AddBid, project).await? else {
            return Ok(None);
        };

        let id = self.db.insert_bid(project_id, &bid).await?;
        info!(project_id, bid_id = id, bidder = bid.bidder(), "bid added");

        Ok(Some(id))
    }
}
