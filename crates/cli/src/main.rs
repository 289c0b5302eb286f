//! Command-line entry point for the temperature records service.

mod commands;

use clap::{Args, Parser, Subcommand};
use commands::{load_records, open_database};
use std::path::PathBuf;
use temperature_telemetry::{init_logging, Metrics};
use temperature_web::AppState;

#[derive(Parser)]
#[command(name = "temperature")]
#[command(about = "Temperature records per country and date")]
struct Cli {
    /// Log filter, overrides RUST_LOG (e.g. "debug", "temperature_loader=debug")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DatabaseArgs {
    /// Database path
    #[arg(long, env = "DATABASE_PATH", default_value = "temperature.db")]
    database_path: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Load temperature records from a csv file
    LoadRecords {
        /// CSV file with date, temperature, uncertainty and country columns
        #[arg(value_name = "CSV_FILE")]
        csv_file: PathBuf,

        #[command(flatten)]
        db: DatabaseArgs,

        /// Append a JSON summary of the import to this file
        #[arg(long)]
        report_path: Option<PathBuf>,
    },
    /// Serve the record list and the admin endpoints
    Serve {
        #[command(flatten)]
        db: DatabaseArgs,

        /// Address to listen on
        #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:8000")]
        bind_address: String,
    },
    /// Create or upgrade the database schema
    Migrate {
        #[command(flatten)]
        db: DatabaseArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::LoadRecords {
            csv_file,
            db,
            report_path,
        } => {
            let mut stdout = std::io::stdout();
            load_records(&csv_file, &db.database_path, report_path, &mut stdout).await?;
        }
        Commands::Serve { db, bind_address } => {
            let db = open_database(&db.database_path).await?;
            let state = AppState::new(db, Metrics::new()?);
            temperature_web::serve(&bind_address, state).await?;
        }
        Commands::Migrate { db } => {
            open_database(&db.database_path).await?;
        }
    }

    Ok(())
}
