use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tax_core::UserId;
use tax_data::CalculationLoader;
use tax_db_sqlite::SqliteRepository;

/// Import taxpayer figures from a CSV file, compute both regimes for each
/// row and save the results to a user's calculation history.
///
/// The CSV file should have the following columns:
/// - age_group: below60, between60and80 or above80
/// - selected_regime: old or new
/// - salary, interest, rental, capital_gains, other: income amounts
/// - section_80c, section_80d, section_24, section_80ccd, section_80g,
///   section_80e, section_80tta: deduction amounts
///
/// Empty amount cells are read as zero.
#[derive(Parser, Debug)]
#[command(name = "tax-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing taxpayer figures
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database path (created if missing)
    #[arg(short, long, default_value = "taxease.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// User the imported calculations belong to
    #[arg(short, long)]
    user: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let user = UserId::new(args.user.trim());
    if user.is_blank() {
        bail!("--user must not be blank");
    }

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    println!("Loading calculations from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let rows = CalculationLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} rows from CSV", rows.len());

    let saved = CalculationLoader::load(&repo, &user, &rows)
        .await
        .context("Failed to save calculations")?;

    println!("Successfully saved {} calculations for {}.", saved, user);

    Ok(())
}
