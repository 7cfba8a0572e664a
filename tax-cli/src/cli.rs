use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tax_core::calculations::parse_amount;
use tax_core::{AgeGroup, CalculationRequest, DbConfig, DeductionInputs, IncomeInputs, Regime};

/// Compare Indian income tax under the old and new regimes.
///
/// `compare` works offline; every other command reads or writes the
/// calculation history in the configured database.
#[derive(Debug, Parser)]
#[command(name = "taxease", version)]
pub struct Cli {
    /// Database backend to use.
    #[arg(long, global = true, default_value = "sqlite")]
    pub backend: String,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `taxease.db`) or `:memory:`.
    #[arg(long, global = true, default_value = "taxease.db")]
    pub db: String,

    /// Log filter, e.g. `debug` or `tax_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.backend.clone(),
            connection_string: self.db.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare both regimes without saving anything
    Compare {
        #[command(flatten)]
        input: InputArgs,

        /// Write a text report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Compare both regimes and save the result to a user's history
    Save {
        /// User the calculation belongs to
        #[arg(long)]
        user: String,

        #[command(flatten)]
        input: InputArgs,

        /// Write a text report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List a user's saved calculations, newest first
    History {
        #[arg(long)]
        user: String,
    },

    /// Print the full report for a saved calculation
    Show {
        #[arg(long)]
        id: i64,
    },

    /// Delete a saved calculation
    Delete {
        #[arg(long)]
        id: i64,
    },

    /// Compute and save every row of a CSV file for a user
    Import {
        #[arg(long)]
        user: String,

        /// CSV with columns age_group,selected_regime,salary,...,section_80tta
        #[arg(long)]
        file: PathBuf,
    },
}

/// Taxpayer figures as typed on the command line.
///
/// Amounts are free text: `1,50,000` is accepted, and anything that is not
/// a non-negative number counts as zero.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// below60, between60and80 or above80
    #[arg(long, default_value = "below60", value_parser = parse_age_group)]
    pub age_group: AgeGroup,

    /// Regime the taxpayer intends to file under: old or new
    #[arg(long, default_value = "old", value_parser = parse_regime)]
    pub regime: Regime,

    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub salary: String,
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub interest: String,
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub rental: String,
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub capital_gains: String,
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub other: String,

    /// Section 80C investments (capped at 1,50,000)
    #[arg(long = "section-80c", default_value = "0", allow_hyphen_values = true)]
    pub section_80c: String,
    /// Section 80D medical insurance premiums
    #[arg(long = "section-80d", default_value = "0", allow_hyphen_values = true)]
    pub section_80d: String,
    /// Section 24(b) home-loan interest
    #[arg(long = "section-24", default_value = "0", allow_hyphen_values = true)]
    pub section_24: String,
    /// Section 80CCD pension contributions
    #[arg(long = "section-80ccd", default_value = "0", allow_hyphen_values = true)]
    pub section_80ccd: String,
    /// Section 80G donations
    #[arg(long = "section-80g", default_value = "0", allow_hyphen_values = true)]
    pub section_80g: String,
    /// Section 80E education-loan interest
    #[arg(long = "section-80e", default_value = "0", allow_hyphen_values = true)]
    pub section_80e: String,
    /// Section 80TTA savings interest
    #[arg(long = "section-80tta", default_value = "0", allow_hyphen_values = true)]
    pub section_80tta: String,
}

impl InputArgs {
    pub fn to_request(&self) -> CalculationRequest {
        CalculationRequest {
            age_group: self.age_group,
            selected_regime: self.regime,
            income: IncomeInputs {
                salary: parse_amount(&self.salary),
                interest: parse_amount(&self.interest),
                rental: parse_amount(&self.rental),
                capital_gains: parse_amount(&self.capital_gains),
                other: parse_amount(&self.other),
            },
            deductions: DeductionInputs {
                section_80c: parse_amount(&self.section_80c),
                section_80d: parse_amount(&self.section_80d),
                section_24: parse_amount(&self.section_24),
                section_80ccd: parse_amount(&self.section_80ccd),
                section_80g: parse_amount(&self.section_80g),
                section_80e: parse_amount(&self.section_80e),
                section_80tta: parse_amount(&self.section_80tta),
            },
        }
    }
}

fn parse_age_group(s: &str) -> Result<AgeGroup, String> {
    AgeGroup::parse(s)
        .ok_or_else(|| format!("unknown age group '{s}' (expected below60, between60and80 or above80)"))
}

fn parse_regime(s: &str) -> Result<Regime, String> {
    Regime::parse(s).ok_or_else(|| format!("unknown regime '{s}' (expected old or new)"))
}
