//! Helios database check CLI
//!
//! Probes, inspects or prepares the database selected by a profile.

use clap::{Parser, Subcommand};
use helios_dbcheck::{Database, DbConfig, Profile, init_logging, schema};
use tracing::info;

/// Database check utility.
#[derive(Debug, Parser)]
#[command(
    name = "dbcheck",
    version,
    about = "PostgreSQL fixture database utility"
)]
struct Cli {
    /// Connection profile (local, remote_for_check).
    #[arg(long, env = "TEST_ENV", default_value = "local")]
    profile: Profile,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "DBCHECK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Connect and run the liveness probe.
    Probe,
    /// List a table's columns.
    Describe {
        /// Table name, as stored (lowercase unless quoted at creation).
        table: String,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Create the people and persons tables if missing.
    InitSchema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = DbConfig::for_profile(cli.profile, |name| std::env::var(name).ok())?;
    info!(profile = %cli.profile, host = ?config.host, dbname = ?config.dbname, "Resolved profile");
    let db = Database::new(config)?;

    match cli.command {
        Command::Probe => {
            db.health_check().await?;
            println!("ok");
        }
        Command::Describe { table, json } => {
            let session = db.session().await?;
            let columns = schema::columns(&session, &table).await?;
            session.close().await?;

            if columns.is_empty() {
                anyhow::bail!("table '{}' not found in schema '{}'", table, schema::SCHEMA);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                let width = columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
                for column in &columns {
                    println!(
                        "{:<width$}  {}",
                        column.name,
                        column.data_type,
                        width = width
                    );
                }
            }
        }
        Command::InitSchema => {
            db.install_fixture_schema().await?;
            println!("fixture schema ready");
        }
    }

    Ok(())
}
