//! Menu dispatch
//!
//! A session owns the store. Each command runs exactly one operation and
//! comes back as an [`Outcome`] the shell can show.

use crate::core::{
    BidOps, ExportArtifact, Exporter, Presenter, ProcurementOps, ProjectBlock, ProjectOps,
};
use crate::db::{Database, NewBid, NewProcurementItem, NewProject, ProjectRef, StoreStats};
use crate::error::{DeskError, Guard, Result};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Entries of the main menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddProject,
    AddBid,
    ManageProcurement,
    ViewProjects,
    DownloadData,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 5] = [
        MenuChoice::AddProject,
        MenuChoice::AddBid,
        MenuChoice::ManageProcurement,
        MenuChoice::ViewProjects,
        MenuChoice::DownloadData,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::AddProject => "Add Project",
            MenuChoice::AddBid => "Add Bid",
            MenuChoice::ManageProcurement => "Manage Procurement",
            MenuChoice::ViewProjects => "View Projects",
            MenuChoice::DownloadData => "Download Data",
        }
    }

    /// Guard for choices that need at least one project before their form
    pub fn guard(&self) -> Option<Guard> {
        match self {
            MenuChoice::AddBid => Some(Guard::AddBid),
            MenuChoice::ManageProcurement => Some(Guard::AddProcurementItem),
            _ => None,
        }
    }

    /// Work out which entry the user meant
    ///
    /// Accepts a 1-based position, the label (any case, `-` or `_` for
    /// spaces) or a fuzzy abbreviation such as `bid` or `procure`. The best
    /// fuzzy score wins; ties go to the earlier entry.
    pub fn resolve(input: &str) -> Option<Self> {
        let normalized = input.trim().replace(['-', '_'], " ");
        if normalized.is_empty() {
            return None;
        }

        if let Ok(position) = normalized.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied());
        }

        if let Some(choice) = Self::ALL
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(&normalized))
        {
            return Some(*choice);
        }

        let matcher = SkimMatcherV2::default().ignore_case();
        let mut best: Option<(i64, MenuChoice)> = None;
        for choice in Self::ALL {
            if let Some(score) = matcher.fuzzy_match(choice.label(), &normalized) {
                if best.map_or(true, |(top, _)| score > top) {
                    best = Some((score, choice));
                }
            }
        }

        best.map(|(_, choice)| choice)
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A fully validated request for one operation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddProject(NewProject),
    AddBid { project: ProjectRef, bid: NewBid },
    AddProcurementItem { project: ProjectRef, item: NewProcurementItem },
    ViewProjects,
    ExportSummary,
}

impl Command {
    /// Menu entry this command belongs to
    pub fn choice(&self) -> MenuChoice {
        match self {
            Command::AddProject(_) => MenuChoice::AddProject,
            Command::AddBid { .. } => MenuChoice::AddBid,
            Command::AddProcurementItem { .. } => MenuChoice::ManageProcurement,
            Command::ViewProjects => MenuChoice::ViewProjects,
            Command::ExportSummary => MenuChoice::DownloadData,
        }
    }
}

/// What the user gets to see after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(String),
    Warning(String),
    /// Nothing to report, e.g. the selected project no longer matches
    Silent,
    Listing(Vec<ProjectBlock>),
    Export(ExportArtifact),
    Text(String),
}

impl Outcome {
    fn warning(guard: Guard) -> Self {
        Outcome::Warning(guard.warning().to_string())
    }
}

/// One interactive session and the store it owns
pub struct Session {
    db: Arc<Database>,
    projects: ProjectOps,
    bids: BidOps,
    procurement: ProcurementOps,
    presenter: Presenter,
    exporter: Exporter,
}

impl Session {
    /// Start a session with an empty store
    pub async fn start() -> Result<Self> {
        let db = Database::in_memory().await?;
        Ok(Self::with_database(Arc::new(db)))
    }

    pub fn with_database(db: Arc<Database>) -> Self {
        Self {
            projects: ProjectOps::new(Arc::clone(&db)),
            bids: BidOps::new(Arc::clone(&db)),
            procurement: ProcurementOps::new(Arc::clone(&db)),
            presenter: Presenter::new(Arc::clone(&db)),
            exporter: Exporter::new(Arc::clone(&db)),
            db,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Run one command against the store
    pub async fn dispatch(&self, command: Command) -> Result<Outcome> {
        debug!(choice = %command.choice(), "dispatching");

        match command {
            Command::AddProject(input) => {
                self.projects.add_project(input).await?;
                Ok(Outcome::Success("Project added successfully!".to_string()))
            }
            Command::AddBid { project, bid } => {
                match self.bids.add_bid(&project, bid).await {
                    Ok(Some(_)) => Ok(Outcome::Success("Bid added successfully!".to_string())),
                    Ok(None) => Ok(Outcome::Silent),
                    Err(DeskError::EmptyStore(guard)) => Ok(Outcome::warning(guard)),
                    Err(e) => Err(e),
                }
            }
            Command::AddProcurementItem { project, item } => {
                match self.procurement.add_procurement_item(&project, item).await {
                    Ok(Some(_)) => Ok(Outcome::Success(
                        "Procurement item added successfully!".to_string(),
                    )),
                    Ok(None) => Ok(Outcome::Silent),
                    Err(DeskError::EmptyStore(guard)) => Ok(Outcome::warning(guard)),
                    Err(e) => Err(e),
                }
            }
            Command::ViewProjects => match self.presenter.list_projects().await {
                Ok(blocks) => Ok(Outcome::Listing(blocks)),
                Err(DeskError::EmptyStore(guard)) => Ok(Outcome::warning(guard)),
                Err(e) => Err(e),
            },
            Command::ExportSummary => match self.exporter.export_summary().await {
                Ok(artifact) => Ok(Outcome::Export(artifact)),
                Err(DeskError::EmptyStore(guard)) => Ok(Outcome::warning(guard)),
                Err(e) => Err(e),
            },
        }
    }

    /// Warning to show instead of the form, if the choice can't run yet
    pub async fn precheck(&self, choice: MenuChoice) -> Result<Option<Outcome>> {
        match choice.guard() {
            Some(guard) if self.db.project_count().await? == 0 => {
                Ok(Some(Outcome::warning(guard)))
            }
            _ => Ok(None),
        }
    }

    /// Projects to offer in a pick list, in store order
    pub async fn project_choices(&self) -> Result<Vec<(i64, String)>> {
        self.projects.project_choices().await
    }

    /// Store totals
    pub async fn stats(&self) -> Result<StoreStats> {
        self.db.stats().await
    }

    /// The whole store as JSON, or the empty-store warning
    pub async fn store_json(&self) -> Result<Outcome> {
        match self.presenter.render_json().await {
            Ok(json) => Ok(Outcome::Text(json)),
            Err(DeskError::EmptyStore(guard)) => Ok(Outcome::warning(guard)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_project(name: &str) -> Command {
        Command::AddProject(NewProject {
            name: name.to_string(),
            description: "Phase 1".to_string(),
            start_date: date("2024-01-01"),
            end_date: date("2024-06-01"),
        })
    }

    fn bid_for(name: &str) -> Command {
        Command::AddBid {
            project: ProjectRef::Name(name.to_string()),
            bid: NewBid::new("Acme", 1000.50, date("2024-01-15")).unwrap(),
        }
    }

    #[test]
    fn test_resolve_by_position_and_label() {
        assert_eq!(MenuChoice::resolve("1"), Some(MenuChoice::AddProject));
        assert_eq!(MenuChoice::resolve("5"), Some(MenuChoice::DownloadData));
        assert_eq!(MenuChoice::resolve("0"), None);
        assert_eq!(MenuChoice::resolve("6"), None);
        assert_eq!(MenuChoice::resolve("view projects"), Some(MenuChoice::ViewProjects));
        assert_eq!(MenuChoice::resolve("add-project"), Some(MenuChoice::AddProject));
        assert_eq!(MenuChoice::resolve("  Add_Bid "), Some(MenuChoice::AddBid));
    }

    #[test]
    fn test_resolve_fuzzy() {
        assert_eq!(MenuChoice::resolve("bid"), Some(MenuChoice::AddBid));
        assert_eq!(MenuChoice::resolve("procure"), Some(MenuChoice::ManageProcurement));
        assert_eq!(MenuChoice::resolve("download"), Some(MenuChoice::DownloadData));
        assert_eq!(MenuChoice::resolve("VIEW"), Some(MenuChoice::ViewProjects));
        assert_eq!(MenuChoice::resolve("xyz"), None);
        assert_eq!(MenuChoice::resolve("   "), None);
    }

    #[test]
    fn test_command_choice() {
        assert_eq!(Command::ViewProjects.choice(), MenuChoice::ViewProjects);
        assert_eq!(Command::ExportSummary.choice(), MenuChoice::DownloadData);
        assert_eq!(bid_for("x").choice(), MenuChoice::AddBid);
    }

    #[tokio::test]
    async fn test_empty_store_warnings() {
        let session = Session::start().await.unwrap();

        assert_eq!(
            session.dispatch(bid_for("Road Build")).await.unwrap(),
            Outcome::Warning("No projects available. Please add a project first.".into())
        );
        assert_eq!(
            session.dispatch(Command::ViewProjects).await.unwrap(),
            Outcome::Warning("No projects available.".into())
        );
        assert_eq!(
            session.dispatch(Command::ExportSummary).await.unwrap(),
            Outcome::Warning("No projects available to download.".into())
        );
        assert_eq!(session.stats().await.unwrap().total_bids, 0);
    }

    #[tokio::test]
    async fn test_precheck() {
        let session = Session::start().await.unwrap();

        assert!(session.precheck(MenuChoice::AddProject).await.unwrap().is_none());
        assert!(matches!(
            session.precheck(MenuChoice::ManageProcurement).await.unwrap(),
            Some(Outcome::Warning(_))
        ));

        session.dispatch(new_project("Road Build")).await.unwrap();
        assert!(session.precheck(MenuChoice::AddBid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_end_to_end_listing() {
        let session = Session::start().await.unwrap();

        assert_eq!(
            session.dispatch(new_project("Road Build")).await.unwrap(),
            Outcome::Success("Project added successfully!".into())
        );
        assert_eq!(
            session.dispatch(bid_for("Road Build")).await.unwrap(),
            Outcome::Success("Bid added successfully!".into())
        );

        match session.dispatch(Command::ViewProjects).await.unwrap() {
            Outcome::Listing(blocks) => {
                assert_eq!(blocks.len(), 1);
                assert!(blocks[0].contains_line("- Acme: $1000.5 on 2024-01-15"));
            }
            other => panic!("Expected listing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_reference_is_silent() {
        let session = Session::start().await.unwrap();
        session.dispatch(new_project("Road Build")).await.unwrap();

        assert_eq!(
            session.dispatch(bid_for("Gone")).await.unwrap(),
            Outcome::Silent
        );

        let item = Command::AddProcurementItem {
            project: ProjectRef::Id(999),
            item: NewProcurementItem::new("Sand", 1, 1.0).unwrap(),
        };
        assert_eq!(session.dispatch(item).await.unwrap(), Outcome::Silent);

        let stats = session.stats().await.unwrap();
        assert_eq!(stats.total_bids, 0);
        assert_eq!(stats.total_procurement_items, 0);
    }

    #[tokio::test]
    async fn test_export_outcome() {
        let session = Session::start().await.unwrap();
        session.dispatch(new_project("Road Build")).await.unwrap();

        match session.dispatch(Command::ExportSummary).await.unwrap() {
            Outcome::Export(artifact) => {
                assert_eq!(artifact.file_name, "project_data.csv");
                assert!(artifact
                    .as_text()
                    .unwrap()
                    .contains("Road Build,Phase 1,2024-01-01,2024-06-01,0,0"));
            }
            other => panic!("Expected export, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_json() {
        let session = Session::start().await.unwrap();
        assert!(matches!(
            session.store_json().await.unwrap(),
            Outcome::Warning(_)
        ));

        session.dispatch(new_project("Road Build")).await.unwrap();
        match session.store_json().await.unwrap() {
            Outcome::Text(json) => assert!(json.contains("\"Road Build\"")),
            other => panic!("Expected text, got {:?}", other),
        }
    }
}
