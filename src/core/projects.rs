// Adds projects to the session store
//
// Nothing is validated here. A blank name is still a project.

use crate::db::{Database, NewProject, ProjectRef};
use crate::error::{DeskError, Guard, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ProjectOps {
    db: Arc<Database>,
}

impl ProjectOps {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a project with no bids and no procurement items
    ///
    /// # Returns
    /// * `Ok(i64)` - The generated project ID
    pub async fn add_project(&self, input: NewProject) -> Result<i64> {
        let id = self.db.insert_project(&input).await?;
        info!(project_id = id, name = %input.name, "project added");
        Ok(id)
    }

    /// Names of all projects in store order, for pick lists
    pub async fn project_choices(&self) -> Result<Vec<(i64, String)>> {
        let rows = self.db.list_project_rows().await?;
        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }
}

/// Find the project a child record should be attached to.
///
/// An empty store is refused with `guard`. A reference that matches nothing
/// comes back as `Ok(None)` and the caller skips the write.
pub(crate) async fn attach_target(
    db: &Database,
    guard: Guard,
    project: &ProjectRef,
) -> Result<Option<i64>> {
    if db.project_count().await? == 0 {
        return Err(DeskError::EmptyStore(guard));
    }

    let target = db.resolve_project(project).await?;
    if target.is_none() {
        debug!(%project, action = %guard, "no project matched; nothing written");
    }

    Ok(target)
}
