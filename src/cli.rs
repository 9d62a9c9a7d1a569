//! Command-line interface definition using clap.

use clap::Parser;
use std::path::PathBuf;

/// bid-desk - track procurement projects, bids and line items for one session
#[derive(Parser, Debug)]
#[command(name = "bid-desk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory that receives project_data.csv on download
    #[arg(short, long, env = "BID_DESK_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,
}

impl Cli {
    /// Returns the export directory, falling back to the user's downloads
    /// folder and then the working directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
