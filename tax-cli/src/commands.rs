//! Command handlers: each one runs against the service layer and writes its
//! human-readable output to `out`.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tax_core::calculations::advise;
use tax_core::{CalculationRequest, CalculationService, DbConfig, TaxComparison, TaxReport, UserId};
use tax_data::CalculationLoader;
use tracing::{debug, info};

use crate::app;
use crate::cli::{Cli, Command};
use crate::display;

pub async fn run<W: Write>(
    cli: Cli,
    out: &mut W,
) -> Result<()> {
    let config = cli.db_config();
    let service = || app::open_service(&config);

    match cli.command {
        Command::Compare { input, report } => compare(&input.to_request(), report.as_deref(), out),
        Command::Save {
            user,
            input,
            report,
        } => {
            let request = input.to_request();
            save(&config, &UserId::new(user), &request, report.as_deref(), out).await
        }
        Command::History { user } => history(&service().await?, &UserId::new(user), out).await,
        Command::Show { id } => show(&service().await?, id, out).await,
        Command::Delete { id } => delete(&service().await?, id, out).await,
        Command::Import { user, file } => {
            import(&service().await?, &UserId::new(user), &file, out).await
        }
    }
}

pub fn compare<W: Write>(
    request: &CalculationRequest,
    report: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    let comparison = request.compare();
    write_calculation(request, &comparison, out)?;

    if let Some(path) = report {
        write_report(path, request, &comparison)?;
        writeln!(out, "Report written to {}", path.display())?;
    }
    Ok(())
}

/// Computes and prints, then opens the store and saves. The comparison and
/// report are written even when the store cannot be opened or the save
/// fails; the failure is returned afterwards.
pub async fn save<W: Write>(
    config: &DbConfig,
    user: &UserId,
    request: &CalculationRequest,
    report: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    compare(request, report, out)?;

    let service = app::open_service(config)
        .await
        .context("Calculation was computed but not saved")?;
    let record = service
        .calculate(Some(user), request)
        .await
        .saved
        .context("Calculation was computed but not saved")?;
    writeln!(out)?;
    writeln!(out, "Saved calculation #{} for {}", record.id, record.user_id)?;
    Ok(())
}

pub async fn history<W: Write>(
    service: &CalculationService,
    user: &UserId,
    out: &mut W,
) -> Result<()> {
    let records = service
        .history(Some(user))
        .await
        .with_context(|| format!("Failed to load history for {}", user))?;
    debug!(count = records.len(), "loaded history");
    display::write_history(out, &records)?;
    Ok(())
}

pub async fn show<W: Write>(
    service: &CalculationService,
    id: i64,
    out: &mut W,
) -> Result<()> {
    let record = service
        .repository()
        .get_calculation(id)
        .await
        .with_context(|| format!("Failed to load calculation #{}", id))?;

    let advice = advise(
        &record.result,
        record.selected_regime,
        record.age_group,
        &record.deductions,
    );
    let report = TaxReport {
        regime: record.selected_regime,
        age_group: record.age_group,
        income: &record.income,
        deductions: &record.deductions,
        comparison: &record.result,
        advice: &advice,
    };
    writeln!(
        out,
        "Calculation #{} for {}, saved {}",
        record.id,
        record.user_id,
        record.created_at.format("%Y-%m-%d %H:%M")
    )?;
    write!(out, "{}", report)?;
    Ok(())
}

pub async fn delete<W: Write>(
    service: &CalculationService,
    id: i64,
    out: &mut W,
) -> Result<()> {
    service
        .repository()
        .delete_calculation(id)
        .await
        .with_context(|| format!("Failed to delete calculation #{}", id))?;
    info!(id, "calculation deleted");
    writeln!(out, "Deleted calculation #{}", id)?;
    Ok(())
}

pub async fn import<W: Write>(
    service: &CalculationService,
    user: &UserId,
    file: &Path,
    out: &mut W,
) -> Result<()> {
    let reader = File::open(file).with_context(|| format!("Failed to open: {}", file.display()))?;
    let rows = CalculationLoader::parse(reader)
        .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;

    let saved = CalculationLoader::load(service.repository().as_ref(), user, &rows)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    writeln!(out, "Imported {} calculations for {}", saved, user)?;
    Ok(())
}

fn write_calculation<W: Write>(
    request: &CalculationRequest,
    comparison: &TaxComparison,
    out: &mut W,
) -> Result<()> {
    display::write_comparison(out, comparison, request.selected_regime)?;
    let advice = advise(
        comparison,
        request.selected_regime,
        request.age_group,
        &request.deductions.sanitized(),
    );
    display::write_advice(out, &advice)?;
    Ok(())
}

fn write_report(
    path: &Path,
    request: &CalculationRequest,
    comparison: &TaxComparison,
) -> Result<()> {
    let income = request.income.sanitized();
    let deductions = request.deductions.sanitized();
    let advice = advise(comparison, request.selected_regime, request.age_group, &deductions);
    let report = TaxReport {
        regime: request.selected_regime,
        age_group: request.age_group,
        income: &income,
        deductions: &deductions,
        comparison,
        advice: &advice,
    };
    fs::write(path, report.render())
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
