//! Interactive shell for bid-desk.
//!
//! Shows the menu, runs the form for the chosen entry, and prints whatever
//! the dispatcher hands back. Field constraints live here, in the forms.

use std::io::Write;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use crate::core::ExportArtifact;
use crate::db::{NewBid, NewProcurementItem, NewProject, ProjectRef};
use crate::error::{DeskError, Result};
use crate::session::dispatcher::{Command, MenuChoice, Outcome, Session};

const TITLE: &str = "Project Management and Bidding System";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// What came back from a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl+C: drop the current form
    Cancelled,
    /// Ctrl+D or end of input
    Closed,
}

/// Source of user input, one line per prompt
pub trait Prompter {
    fn prompt(&mut self, label: &str) -> Result<Input>;
}

impl Prompter for DefaultEditor {
    fn prompt(&mut self, label: &str) -> Result<Input> {
        match self.readline(label) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.add_history_entry(line.as_str())?;
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Cancelled),
            Err(ReadlineError::Eof) => Ok(Input::Closed),
            Err(e) => Err(e.into()),
        }
    }
}

/// Shell-level commands typed at the main prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Choose(MenuChoice),
    Menu,
    Status,
    Json,
    Quit,
    Empty,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => ShellCommand::Empty,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            "menu" | "help" | "?" => ShellCommand::Menu,
            "status" => ShellCommand::Status,
            "json" => ShellCommand::Json,
            _ => match MenuChoice::resolve(trimmed) {
                Some(choice) => ShellCommand::Choose(choice),
                None => ShellCommand::Unknown(trimmed.to_string()),
            },
        }
    }
}

/// Parse a date field. Blank means `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(today);
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
        DeskError::InvalidInput(format!("'{}' is not a date (use YYYY-MM-DD)", trimmed))
    })
}

/// Parse a money field: at least 0, rounded to the cent. Blank means 0.00.
pub fn parse_money(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| DeskError::InvalidInput(format!("'{}' is not a number", trimmed)))?;

    if !value.is_finite() || value < 0.0 {
        return Err(DeskError::InvalidInput(
            "amount must be at least 0".to_string(),
        ));
    }

    let rounded = (value * 100.0).round() / 100.0;
    if !rounded.is_finite() {
        return Err(DeskError::InvalidInput(format!("'{}' is too large", trimmed)));
    }

    Ok(rounded)
}

/// Parse a quantity field: whole number, at least 1. Blank means 1.
pub fn parse_quantity(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(1);
    }

    match trimmed.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(DeskError::InvalidInput(
            "quantity must be a whole number of at least 1".to_string(),
        )),
    }
}

/// Turn a pick-list answer into a project reference
///
/// A listed position picks that exact project. Blank picks the first one.
/// Anything else is treated as a name and resolved first-match later; a name
/// in double quotes is always a name, so `"3"` finds a project called 3.
pub fn parse_project_pick(input: &str, choices: &[(i64, String)]) -> ProjectRef {
    let trimmed = input.trim();

    if let Some(name) = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return ProjectRef::Name(name.to_string());
    }

    if trimmed.is_empty() {
        if let Some((id, _)) = choices.first() {
            return ProjectRef::Id(*id);
        }
    }

    if let Ok(position) = trimmed.parse::<usize>() {
        if let Some((id, _)) = position.checked_sub(1).and_then(|i| choices.get(i)) {
            return ProjectRef::Id(*id);
        }
    }

    ProjectRef::Name(trimmed.to_string())
}

/// The interactive shell
pub struct Repl<P: Prompter, W: Write> {
    session: Session,
    prompter: P,
    out: W,
    export_dir: PathBuf,
}

impl<P: Prompter, W: Write> Repl<P, W> {
    pub fn new(session: Session, prompter: P, out: W, export_dir: PathBuf) -> Self {
        Self {
            session,
            prompter,
            out,
            export_dir,
        }
    }

    /// Read commands until the user quits or input runs out
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{} v{}", TITLE, env!("CARGO_PKG_VERSION"))?;
        writeln!(self.out, "Type 'menu' for choices, 'quit' to exit")?;
        self.print_menu()?;

        loop {
            let line = match self.prompter.prompt("bid-desk> ")? {
                Input::Line(line) => line,
                Input::Cancelled => continue,
                Input::Closed => break,
            };

            let command = ShellCommand::parse(&line);
            debug!(?command, "parsed shell command");

            let result = match command {
                ShellCommand::Quit => break,
                ShellCommand::Empty => Ok(()),
                ShellCommand::Menu => self.print_menu(),
                ShellCommand::Status => self.print_status().await,
                ShellCommand::Json => self.print_json().await,
                ShellCommand::Choose(choice) => self.run_choice(choice).await,
                ShellCommand::Unknown(text) => {
                    writeln!(self.out, "Unknown choice: {} (type 'menu')", text)?;
                    Ok(())
                }
            };

            // An error in one cycle never ends the session
            if let Err(e) = result {
                warn!(error = %e, "command failed");
                writeln!(self.out, "Error: {}", e.user_message())?;
            }
        }

        self.session.database().close().await;
        writeln!(self.out, "Goodbye!")?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\nMenu:")?;
        for (i, choice) in MenuChoice::ALL.iter().enumerate() {
            writeln!(self.out, "  {}. {}", i + 1, choice)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    async fn print_status(&mut self) -> Result<()> {
        let stats = self.session.stats().await?;
        writeln!(self.out, "Projects:          {}", stats.total_projects)?;
        writeln!(self.out, "Bids:              {}", stats.total_bids)?;
        writeln!(self.out, "Procurement items: {}", stats.total_procurement_items)?;
        writeln!(self.out, "Export directory:  {}", self.export_dir.display())?;
        Ok(())
    }

    async fn print_json(&mut self) -> Result<()> {
        let outcome = self.session.store_json().await?;
        self.render(outcome)
    }

    async fn run_choice(&mut self, choice: MenuChoice) -> Result<()> {
        writeln!(self.out, "\n== {} ==", choice)?;

        if let Some(outcome) = self.session.precheck(choice).await? {
            return self.render(outcome);
        }

        let command = match choice {
            MenuChoice::AddProject => self.project_form()?,
            MenuChoice::AddBid => self.bid_form().await?,
            MenuChoice::ManageProcurement => self.procurement_form().await?,
            MenuChoice::ViewProjects => Some(Command::ViewProjects),
            MenuChoice::DownloadData => Some(Command::ExportSummary),
        };

        let Some(command) = command else {
            writeln!(self.out, "Cancelled.")?;
            return Ok(());
        };

        let outcome = self.session.dispatch(command).await?;
        self.render(outcome)
    }

    fn project_form(&mut self) -> Result<Option<Command>> {
        let today = Local::now().date_naive();

        let Some(name) = self.text_field("Project Name")? else {
            return Ok(None);
        };
        let Some(description) = self.text_field("Project Description")? else {
            return Ok(None);
        };
        let Some(start_date) = self.field("Start Date [YYYY-MM-DD, blank = today]", |s| {
            parse_date(s, today)
        })?
        else {
            return Ok(None);
        };
        let Some(end_date) = self.field("End Date [YYYY-MM-DD, blank = today]", |s| {
            parse_date(s, today)
        })?
        else {
            return Ok(None);
        };

        Ok(Some(Command::AddProject(NewProject {
            name,
            description,
            start_date,
            end_date,
        })))
    }

    async fn bid_form(&mut self) -> Result<Option<Command>> {
        let today = Local::now().date_naive();

        let Some(project) = self.project_field().await? else {
            return Ok(None);
        };
        let Some(bidder) = self.text_field("Bidder Name")? else {
            return Ok(None);
        };
        let Some(amount) = self.field("Bid Amount [>= 0, step 0.01]", parse_money)? else {
            return Ok(None);
        };
        let Some(date) = self.field("Bid Date [YYYY-MM-DD, blank = today]", |s| {
            parse_date(s, today)
        })?
        else {
            return Ok(None);
        };

        let bid = NewBid::new(bidder, amount, date)?;
        Ok(Some(Command::AddBid { project, bid }))
    }

    async fn procurement_form(&mut self) -> Result<Option<Command>> {
        let Some(project) = self.project_field().await? else {
            return Ok(None);
        };
        let Some(name) = self.text_field("Item Name")? else {
            return Ok(None);
        };
        let Some(quantity) = self.field("Quantity [>= 1]", parse_quantity)? else {
            return Ok(None);
        };
        let Some(unit_price) = self.field("Unit Price [>= 0, step 0.01]", parse_money)? else {
            return Ok(None);
        };

        let item = NewProcurementItem::new(name, quantity, unit_price)?;
        Ok(Some(Command::AddProcurementItem { project, item }))
    }

    async fn project_field(&mut self) -> Result<Option<ProjectRef>> {
        let choices = self.session.project_choices().await?;

        writeln!(self.out, "Select Project:")?;
        for (i, (_, name)) in choices.iter().enumerate() {
            writeln!(self.out, "  {}. {}", i + 1, name)?;
        }

        match self.prompter.prompt("Project [number, name or \"quoted name\", blank = 1]: ")? {
            Input::Line(line) => Ok(Some(parse_project_pick(&line, &choices))),
            Input::Cancelled | Input::Closed => Ok(None),
        }
    }

    fn text_field(&mut self, label: &str) -> Result<Option<String>> {
        match self.prompter.prompt(&format!("{}: ", label))? {
            Input::Line(line) => Ok(Some(line)),
            Input::Cancelled | Input::Closed => Ok(None),
        }
    }

    /// Prompt until `parse` accepts the answer or the user gives up
    fn field<T, F>(&mut self, label: &str, parse: F) -> Result<Option<T>>
    where
        F: Fn(&str) -> Result<T>,
    {
        loop {
            let line = match self.prompter.prompt(&format!("{}: ", label))? {
                Input::Line(line) => line,
                Input::Cancelled | Input::Closed => return Ok(None),
            };

            match parse(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => writeln!(self.out, "  {}", e.user_message())?,
            }
        }
    }

    fn render(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Success(msg) => writeln!(self.out, "✓ {}", msg)?,
            Outcome::Warning(msg) => writeln!(self.out, "⚠ {}", msg)?,
            Outcome::Silent => {}
            Outcome::Listing(blocks) => {
                for block in blocks {
                    write!(self.out, "\n{}", block)?;
                }
            }
            Outcome::Export(artifact) => self.deliver(&artifact)?,
            Outcome::Text(text) => writeln!(self.out, "{}", text)?,
        }
        Ok(())
    }

    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<()> {
        let path = artifact.write_to(&self.export_dir)?;
        writeln!(
            self.out,
            "✓ Saved {} ({}, {} bytes) to {}",
            artifact.file_name,
            artifact.mime,
            artifact.bytes.len(),
            path.display()
        )?;
        Ok(())
    }
}
