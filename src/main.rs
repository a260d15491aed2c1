mod config;
mod db;
mod email;
mod extract;
mod import;
mod mbox;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::import::Threshold;

const DEFAULT_MBOX: &str = "DCP.mbox";

#[derive(Parser)]
#[command(
    name = "dcp_importer",
    about = "Import Daily Coding Problem emails from an mbox archive"
)]
struct Cli {
    /// Defaults to `import DCP.mbox`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store every problem newer than the latest stored one
    Import {
        /// mbox archive to read
        #[arg(default_value = DEFAULT_MBOX)]
        mbox: PathBuf,
        /// Treat N as the latest stored number instead of querying the store
        #[arg(long, value_name = "N")]
        since: Option<i64>,
    },
    /// Show stored problem statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Import {
        mbox: PathBuf::from(DEFAULT_MBOX),
        since: None,
    });

    let config = Config::load()?;
    let conn = db::connect(&config)?;

    let result = match command {
        Commands::Import { mbox, since } => {
            let threshold = match since {
                Some(n) => {
                    info!(since = n, "Using threshold from command line");
                    n
                }
                None => {
                    let latest = db::latest_problem_number(&conn)?;
                    info!(latest, "Latest problem number");
                    latest
                }
            };
            let archive = mbox::Archive::open(&mbox)?;
            let counts = import::run(&conn, archive, Threshold::new(threshold))?;
            counts.print();
            Ok(())
        }
        Commands::Stats => {
            println!("{}", db::get_stats(&conn)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
