// bid-desk - procurement projects, bids and line items for one session
//
// Parses CLI args, sets up logging, then hands over to the interactive shell.
// Nothing outlives the process except a downloaded project_data.csv.

use anyhow::Context;
use bid_desk_lib::cli::Cli;
use bid_desk_lib::session::{Repl, Session};
use clap::Parser;
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let export_dir = cli.export_dir();
    info!(export_dir = %export_dir.display(), "starting session");

    let session = Session::start()
        .await
        .context("could not open the session store")?;
    let editor = DefaultEditor::new().context("could not open the terminal")?;

    let mut repl = Repl::new(session, editor, std::io::stdout(), export_dir);
    repl.run().await.context("shell stopped unexpectedly")?;

    Ok(())
}
