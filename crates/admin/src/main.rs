// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod csv_data;

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use pbi::{RecalculationOutcome, VersionComparison, VersionRecord};
use pbi_domain::{
    AllocationType, ConfigurationSnapshot, FormulaConfig, KpiSnapshot, PerformanceMethod,
    RemunerationFormulaSnapshot, ReportMonth, WorkerAllocationRule, validate_allocation_rule,
    validate_kpi, validate_remuneration_formula,
};
use pbi_engine::{
    CreatedVersion, HistoricalRemunerationCalculation, VersionChangeRequest,
    compare_versions, create_new_version, force_recalculation_for_month,
    get_available_versions, get_current_configuration_snapshot, get_facility_remuneration,
    get_version_history, list_calculated_facilities,
};
use pbi_persistence::Persistence;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::csv_data::CsvDataDirectory;

/// PBI Admin - administration CLI for the PBI Remuneration Engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "PBI_DATABASE")]
    database: Option<String>,

    /// Directory holding `facilities.csv`, `workers.csv` and `field_values.csv`
    #[arg(long, env = "PBI_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Declare, list and compare calculation versions
    Versions {
        #[command(subcommand)]
        command: VersionsCommand,
    },
    /// Show a facility's remuneration for a month
    Remuneration {
        /// The facility identifier
        #[arg(long)]
        facility: String,
        /// The report month, `YYYY-MM`
        #[arg(long)]
        month: String,
        /// Recalculate even if figures are stored
        #[arg(long)]
        force: bool,
    },
    /// List the facilities whose remuneration for a month is stored
    Calculated {
        /// The report month, `YYYY-MM`
        #[arg(long)]
        month: String,
    },
    /// Recalculate every facility that reported data for a month
    Recalculate {
        /// The report month, `YYYY-MM`
        #[arg(long)]
        month: String,
        /// The administrator requesting the recalculation
        #[arg(long)]
        admin: String,
        /// Why the stored figures are being replaced
        #[arg(long)]
        reason: String,
    },
    /// Edit the live calculation configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum VersionsCommand {
    /// List declared versions, newest first
    List,
    /// Declare a version from the live configuration
    Create {
        /// The version, `major.minor[.patch]`
        version: String,
        #[arg(long)]
        admin: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Compare the configuration frozen by two versions
    Compare { old: String, new: String },
    /// Show version declarations and forced recalculations
    History,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the live configuration
    Show,
    /// Add or replace a KPI
    SetKpi {
        field_code: String,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        target: f64,
        /// Formula configuration as JSON
        #[arg(long)]
        formula: Option<String>,
    },
    /// Remove a KPI
    RemoveKpi { field_code: String },
    /// Set the facility incentive amount and performance method
    SetFormula {
        #[arg(long)]
        incentive: f64,
        /// `weighted_average` or `simple_average`
        #[arg(long, default_value = "weighted_average")]
        method: String,
    },
    /// Add or replace a worker allocation rule
    SetAllocation {
        facility_type: String,
        category: String,
        /// `individual` or `performance`
        #[arg(long = "type")]
        allocation_type: String,
        #[arg(long)]
        amount: f64,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();

    // Logs go to stderr so command output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err:?}");
            std::process::exit(1);
        }
    }
    Ok(())
}

impl Args {
    fn open_persistence(&self) -> Result<Persistence> {
        if let Some(db_path) = &self.database {
            info!("Using file-based database at: {}", db_path);
            Persistence::new_with_file(db_path)
                .wrap_err_with(|| format!("Failed to open database at {db_path}"))
        } else {
            info!("Using in-memory database");
            Persistence::new_in_memory().wrap_err("Failed to initialize in-memory database")
        }
    }

    fn run(self) -> Result<()> {
        let mut persistence: Persistence = self.open_persistence()?;
        self.command.run(&mut persistence, &self.data_dir)
    }
}

impl Command {
    fn run(self, persistence: &mut Persistence, data_dir: &Path) -> Result<()> {
        match self {
            Self::Versions { command } => command.run(persistence),
            Self::Remuneration {
                facility,
                month,
                force,
            } => {
                let month: ReportMonth = parse_month(&month)?;
                let data: CsvDataDirectory = CsvDataDirectory::new(data_dir);
                let result: HistoricalRemunerationCalculation =
                    get_facility_remuneration(persistence, &data, &facility, month, force)
                        .wrap_err_with(|| {
                            format!("Failed to get remuneration for {facility} in {month}")
                        })?;
                print_json(&result)
            }
            Self::Calculated { month } => {
                let month: ReportMonth = parse_month(&month)?;
                let facilities: Vec<String> = list_calculated_facilities(persistence, month)
                    .wrap_err_with(|| format!("Failed to list calculated facilities for {month}"))?;
                print_json(&facilities)
            }
            Self::Recalculate {
                month,
                admin,
                reason,
            } => {
                let month: ReportMonth = parse_month(&month)?;
                let data: CsvDataDirectory = CsvDataDirectory::new(data_dir);
                let outcome: RecalculationOutcome =
                    force_recalculation_for_month(persistence, &data, month, &admin, &reason)
                        .wrap_err_with(|| format!("Failed to recalculate {month}"))?;
                if !outcome.is_complete() {
                    warn!(
                        failed = outcome.errors.len(),
                        "Some facilities were not recalculated"
                    );
                }
                print_json(&outcome)
            }
            Self::Config { command } => command.run(persistence),
        }
    }
}

impl VersionsCommand {
    fn run(self, persistence: &mut Persistence) -> Result<()> {
        match self {
            Self::List => {
                let versions: Vec<VersionRecord> = get_available_versions(persistence)?;
                print_json(&versions)
            }
            Self::Create {
                version,
                admin,
                notes,
            } => {
                let request: VersionChangeRequest = VersionChangeRequest {
                    version,
                    admin_user: admin,
                    notes,
                };
                let created: CreatedVersion = create_new_version(persistence, &request)
                    .wrap_err_with(|| format!("Failed to create version {}", request.version))?;
                print_json(&serde_json::json!({
                    "version": created.version,
                    "event_id": created.event_id,
                    "snapshot": created.snapshot,
                }))
            }
            Self::Compare { old, new } => {
                let comparison: VersionComparison = compare_versions(persistence, &old, &new)
                    .wrap_err_with(|| format!("Failed to compare {old} with {new}"))?;
                print_json(&comparison)
            }
            Self::History => print_json(&get_version_history(persistence)?),
        }
    }
}

impl ConfigCommand {
    fn run(self, persistence: &mut Persistence) -> Result<()> {
        match self {
            Self::Show => {
                let snapshot: ConfigurationSnapshot =
                    get_current_configuration_snapshot(persistence, None)?;
                print_json(&snapshot)
            }
            Self::SetKpi {
                field_code,
                weight,
                target,
                formula,
            } => {
                let kpi: KpiSnapshot = build_kpi(&field_code, weight, target, formula.as_deref())?;
                persistence.upsert_kpi_config(&kpi)?;
                info!(field_code = %kpi.field_code, weight, target, "KPI configured");
                Ok(())
            }
            Self::RemoveKpi { field_code } => {
                if !persistence.delete_kpi_config(&field_code)? {
                    return Err(eyre!("No KPI configured for field {field_code}"));
                }
                info!(field_code = %field_code, "KPI removed");
                Ok(())
            }
            Self::SetFormula { incentive, method } => {
                let method: PerformanceMethod = method.parse()?;
                let formula: RemunerationFormulaSnapshot =
                    RemunerationFormulaSnapshot::new(incentive, method);
                validate_remuneration_formula(&formula)?;
                persistence.set_remuneration_formula(&formula)?;
                info!(incentive, method = %method, "Remuneration formula configured");
                Ok(())
            }
            Self::SetAllocation {
                facility_type,
                category,
                allocation_type,
                amount,
            } => {
                let allocation_type: AllocationType = allocation_type.parse()?;
                let rule: WorkerAllocationRule =
                    WorkerAllocationRule::new(&category, allocation_type, amount);
                validate_allocation_rule(&rule)?;
                persistence.upsert_allocation_rule(&facility_type, &rule)?;
                info!(
                    facility_type = %facility_type,
                    category = %rule.worker_category,
                    "Allocation rule configured"
                );
                Ok(())
            }
        }
    }
}

/// Builds and validates a KPI from command-line input.
///
/// # Errors
///
/// Returns an error if the formula JSON does not parse or the KPI is invalid.
fn build_kpi(
    field_code: &str,
    weight: f64,
    target: f64,
    formula_json: Option<&str>,
) -> Result<KpiSnapshot> {
    let mut kpi: KpiSnapshot = KpiSnapshot::new(field_code.trim(), weight, target);
    if let Some(json) = formula_json {
        let formula: FormulaConfig =
            serde_json::from_str(json).wrap_err("Formula is not a valid formula configuration")?;
        kpi = kpi.with_formula(formula);
    }
    validate_kpi(&kpi)?;
    Ok(kpi)
}

fn parse_month(month: &str) -> Result<ReportMonth> {
    month
        .parse()
        .wrap_err_with(|| format!("Invalid --month {month}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output: String = serde_json::to_string_pretty(value).wrap_err("Failed to serialize output")?;
    println!("{output}");
    Ok(())
}
