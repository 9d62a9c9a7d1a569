//! SQL query functions for the session store
//!
//! Every read returns rows in insertion order (row id ascending).

use crate::db::models::*;
use crate::db::Database;
use crate::error::Result;
use sqlx::Row;

impl Database {
    /// Append a project
    ///
    /// # Returns
    /// * `Ok(i64)` - The generated project ID
    pub async fn insert_project(&self, input: &NewProject) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO projects (name, description, start_date, end_date)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_one(self.pool())
        .await?;

        Ok(result.get(0))
    }

    /// Append a bid to a project
    pub async fn insert_bid(&self, project_id: i64, bid: &NewBid) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO bids (project_id, bidder, amount, bid_date)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(project_id)
        .bind(bid.bidder())
        .bind(bid.amount())
        .bind(bid.date())
        .fetch_one(self.pool())
        .await?;

        Ok(result.get(0))
    }

    /// Append a procurement line item to a project
    pub async fn insert_procurement_item(
        &self,
        project_id: i64,
        item: &NewProcurementItem,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO procurement_items (project_id, item, quantity, unit_price)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(project_id)
        .bind(item.item())
        .bind(i64::from(item.quantity()))
        .bind(item.unit_price())
        .fetch_one(self.pool())
        .await?;

        Ok(result.get(0))
    }

    /// Number of projects in the store
    pub async fn project_count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(self.pool())
            .await?;

        Ok(count.0)
    }

    /// ID of the first project in store order with exactly this name
    pub async fn find_project_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        let id: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM projects WHERE name = ? ORDER BY id ASC LIMIT 1")
                .bind(name)
                .fetch_optional(self.pool())
                .await?;

        Ok(id.map(|(id,)| id))
    }

    /// Check whether a project with this ID exists
    pub async fn project_exists(&self, id: i64) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(found.is_some())
    }

    /// Turn a form reference into a project ID, if anything matches
    pub async fn resolve_project(&self, project: &ProjectRef) -> Result<Option<i64>> {
        match project {
            ProjectRef::Id(id) => Ok(self.project_exists(*id).await?.then_some(*id)),
            ProjectRef::Name(name) => self.find_project_id_by_name(name).await,
        }
    }

    /// All project rows in store order
    pub async fn list_project_rows(&self) -> Result<Vec<ProjectRow>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, name, description, start_date, end_date FROM projects ORDER BY id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Bids of one project in insertion order
    pub async fn bids_for_project(&self, project_id: i64) -> Result<Vec<Bid>> {
        let bids = sqlx::query_as::<_, Bid>(
            "SELECT id, project_id, bidder, amount, bid_date FROM bids WHERE project_id = ? ORDER BY id ASC",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(bids)
    }

    /// Procurement items of one project in insertion order
    pub async fn items_for_project(&self, project_id: i64) -> Result<Vec<ProcurementItem>> {
        let items = sqlx::query_as::<_, ProcurementItem>(
            "SELECT id, project_id, item, quantity, unit_price FROM procurement_items WHERE project_id = ? ORDER BY id ASC",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(items)
    }

    /// Every project with its children loaded
    pub async fn snapshot(&self) -> Result<Vec<Project>> {
        let rows = self.list_project_rows().await?;
        let mut projects = Vec::with_capacity(rows.len());

        for row in rows {
            let bids = self.bids_for_project(row.id).await?;
            let items = self.items_for_project(row.id).await?;
            projects.push(Project::from_row(row, bids, items));
        }

        Ok(projects)
    }

    /// One summary row per project, counts only
    pub async fn project_summaries(&self) -> Result<Vec<ProjectSummary>> {
        let summaries = sqlx::query_as::<_, ProjectSummary>(
            r#"
            SELECT
                p.name,
                p.description,
                p.start_date,
                p.end_date,
                (SELECT COUNT(*) FROM bids b WHERE b.project_id = p.id) AS bid_count,
                (SELECT COUNT(*) FROM procurement_items i WHERE i.project_id = p.id) AS item_count
            FROM projects p
            ORDER BY p.id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn project(name: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            description: format!("{} description", name),
            start_date: date("2024-01-01"),
            end_date: date("2024-06-01"),
        }
    }

    #[tokio::test]
    async fn test_insert_and_snapshot_project() {
        let db = Database::in_memory().await.unwrap();

        let id = db.insert_project(&project("Road Build")).await.unwrap();
        assert!(id > 0);

        let projects = db.snapshot().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, id);
        assert_eq!(projects[0].name, "Road Build");
        assert_eq!(projects[0].start_date, date("2024-01-01"));
        assert!(projects[0].bids.is_empty());
        assert!(projects[0].procurement_items.is_empty());
    }

    #[tokio::test]
    async fn test_children_keep_insertion_order() {
        let db = Database::in_memory().await.unwrap();
        let id = db.insert_project(&project("Bridge")).await.unwrap();

        for (bidder, amount) in [("Zeta", 3.0), ("Acme", 1.0), ("Mid", 2.0)] {
            let bid = NewBid::new(bidder, amount, date("2024-02-01")).unwrap();
            db.insert_bid(id, &bid).await.unwrap();
        }

        let bidders: Vec<String> = db
            .bids_for_project(id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.bidder)
            .collect();
        assert_eq!(bidders, vec!["Zeta", "Acme", "Mid"]);
    }

    #[tokio::test]
    async fn test_find_by_name_is_first_match() {
        let db = Database::in_memory().await.unwrap();

        let first = db.insert_project(&project("Twin")).await.unwrap();
        let second = db.insert_project(&project("Twin")).await.unwrap();
        assert_ne!(first, second);

        let found = db.find_project_id_by_name("Twin").await.unwrap();
        assert_eq!(found, Some(first));

        let missing = db.find_project_id_by_name("twin").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_resolve_project() {
        let db = Database::in_memory().await.unwrap();
        let id = db.insert_project(&project("Depot")).await.unwrap();

        assert_eq!(db.resolve_project(&ProjectRef::Id(id)).await.unwrap(), Some(id));
        assert_eq!(db.resolve_project(&ProjectRef::Id(id + 100)).await.unwrap(), None);
        assert_eq!(
            db.resolve_project(&ProjectRef::Name("Depot".into())).await.unwrap(),
            Some(id)
        );
    }

    #[tokio::test]
    async fn test_project_summaries_count_children() {
        let db = Database::in_memory().await.unwrap();

        let p1 = db.insert_project(&project("P1")).await.unwrap();
        let p2 = db.insert_project(&project("P2")).await.unwrap();

        for bidder in ["A", "B"] {
            let bid = NewBid::new(bidder, 10.0, date("2024-03-01")).unwrap();
            db.insert_bid(p1, &bid).await.unwrap();
        }
        let item = NewProcurementItem::new("Cement", 4, 9.99).unwrap();
        db.insert_procurement_item(p2, &item).await.unwrap();

        let summaries = db.project_summaries().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!((summaries[0].bid_count, summaries[0].item_count), (2, 0));
        assert_eq!((summaries[1].bid_count, summaries[1].item_count), (0, 1));
    }

    #[tokio::test]
    async fn test_procurement_item_round_trip_fields() {
        let db = Database::in_memory().await.unwrap();
        let id = db.insert_project(&project("Depot")).await.unwrap();

        let item = NewProcurementItem::new("Rebar", 12, 3.5).unwrap();
        db.insert_procurement_item(id, &item).await.unwrap();

        let items = db.items_for_project(id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item, "Rebar");
        assert_eq!(items[0].quantity, 12);
        assert_eq!(items[0].unit_price, 3.5);
    }
}
