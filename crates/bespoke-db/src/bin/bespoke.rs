//! # bespoke: BeSpoked Bikes store tool
//!
//! ## Usage
//! ```bash
//! # Load the sample data set (replaces existing rows)
//! cargo run -p bespoke-db --bin bespoke -- seed
//!
//! # Q1 2024 commission report as JSON
//! cargo run -p bespoke-db --bin bespoke -- report --year 2024 --quarter 1
//!
//! # Whole of 2024 as a table, against another database file
//! cargo run -p bespoke-db --bin bespoke -- --db ./shop.db report --year 2024 --format table
//! ```
//!
//! Configuration comes from `BESPOKE_DB_*` environment variables; flags
//! win over the environment. Logs go to stderr (`RUST_LOG`), results to
//! stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use bespoke_core::SalespersonCommission;
use bespoke_db::migrations::migration_status;
use bespoke_db::{seed_sample_data, Database, DbError, ErrorResponse, StoreConfig};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bespoke")]
#[command(about = "Inventory and commission reporting for BeSpoked Bikes")]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides BESPOKE_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Connection pool size (overrides BESPOKE_DB_MAX_CONNECTIONS)
    #[arg(long)]
    max_connections: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the store contents with the sample data set
    Seed,

    /// Commission report per salesperson
    Report {
        /// Calendar year, 0 for all years
        #[arg(long, default_value_t = 0)]
        year: i32,

        /// Quarter 1-4, 0 for the whole year
        #[arg(long, default_value_t = 0)]
        quarter: u32,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Show migration and connection status
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.db {
        config.database_path = path;
    }
    if let Some(max) = cli.max_connections {
        config.max_connections = max;
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = ?err.code(), error = %err, "Command failed");
            let response = ErrorResponse::from(&err);
            match serde_json::to_string(&response) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("Error: {}", response.message),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: StoreConfig) -> Result<(), DbError> {
    info!(path = %config.database_path.display(), "Opening store");
    let db = Database::new(config.db_config()).await?;

    let result = match command {
        Commands::Seed => {
            let summary = seed_sample_data(&db).await?;
            println!(
                "Seeded {} products, {} salespersons, {} customers, {} sales, {} discounts",
                summary.products.len(),
                summary.salespersons.len(),
                summary.customers.len(),
                summary.sales.len(),
                summary.discounts.len()
            );
            Ok(())
        }
        Commands::Report {
            year,
            quarter,
            format,
        } => {
            let rows = db.reports().generate(year, quarter).await?;
            match format {
                Format::Json => {
                    let json = serde_json::to_string_pretty(&rows)
                        .map_err(|e| DbError::Internal(e.to_string()))?;
                    println!("{}", json);
                }
                Format::Table => print_table(&rows),
            }
            Ok(())
        }
        Commands::Status => {
            let (total, applied) = migration_status(db.pool()).await?;
            println!("migrations: {}/{} applied", applied, total);
            println!("healthy:    {}", db.health_check().await);
            Ok(())
        }
    };

    db.close().await;
    result
}

fn print_table(rows: &[SalespersonCommission]) {
    println!(
        "{:>4}  {:<24} {:>6} {:>14} {:>12}",
        "ID", "Salesperson", "Sales", "Total Sales", "Commission"
    );
    for row in rows {
        println!(
            "{:>4}  {:<24} {:>6} {:>14} {:>12}",
            row.salesperson_id,
            format!("{} {}", row.first_name, row.last_name),
            row.num_sales,
            row.total_sales_amount.to_decimal_string(),
            row.total_commission.to_decimal_string()
        );
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bespoke=info,bespoke_db=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
