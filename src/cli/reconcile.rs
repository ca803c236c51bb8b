use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use crate::cli::validate::{print_report, ValidationOptions};
use crate::cli::OutputFormat;
use crate::core::edits::EditSet;
use crate::core::types::Status;
use crate::reconcile::merge::ReconcileOutcome;
use crate::reconcile::session::{ReviewSession, SessionError};
use crate::validation::engine::ValidationReport;

#[derive(Args)]
pub struct ReconcileArgs {
    /// Lab results JSON file
    #[arg(required = true)]
    pub observations: PathBuf,

    /// Reference catalog CSV file
    #[arg(required = true)]
    pub catalog: PathBuf,

    /// JSON edit set with statusUpdates, unitUpdates and dateUpdates
    #[arg(long)]
    pub edits: Option<PathBuf>,

    /// Status correction as NAME=VALUE (inRange, warning, outOfRange, optimal)
    #[arg(long = "status", value_name = "NAME=VALUE")]
    pub statuses: Vec<String>,

    /// Unit correction as NAME=VALUE
    #[arg(long = "unit", value_name = "NAME=VALUE")]
    pub units: Vec<String>,

    /// Date correction as NAME=VALUE
    #[arg(long = "date", value_name = "NAME=VALUE")]
    pub dates: Vec<String>,

    /// Set this date on every result, replacing per-test date corrections
    #[arg(long)]
    pub apply_date: Option<String>,

    /// Output path (default: updated_<name> next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the validation report before saving
    #[arg(long)]
    pub report: bool,

    #[command(flatten)]
    pub options: ValidationOptions,
}

/// Execute reconcile subcommand
///
/// # Errors
///
/// Returns an error if a correction is malformed, the edit set cannot be
/// loaded, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ReconcileArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut session = ReviewSession::load(
        &args.observations,
        &args.catalog,
        &args.options.load_options(),
        args.options.config(),
    );

    let report = session.validate();
    // JSON output stays a single document, so the report is nested in it
    let nested_report = match format {
        OutputFormat::Json if args.report => Some(&report),
        _ => {
            if args.report {
                print_report(&report, format)?;
            } else {
                for message in &report.messages {
                    eprintln!("{message}");
                }
            }
            None
        }
    };

    if session.document().is_none() {
        if nested_report.is_some() {
            let output = serde_json::json!({
                "applied": false,
                "message": SessionError::NoDocument.to_string(),
            });
            print_json(output, nested_report)?;
        }
        return Ok(());
    }

    queue_edits(&args, session.edits_mut())?;
    if let Some(date) = &args.apply_date {
        let applied = session.apply_date_to_all(date)?;
        if verbose {
            eprintln!("Applied date {date} to {applied} tests");
        }
    }

    if verbose {
        eprintln!("Queued {} corrections", session.edits().len());
    }

    let saved = session.save(args.output.as_deref())?;
    match (&saved.outcome, &saved.path) {
        (ReconcileOutcome::Applied(reconciled), Some(path)) => {
            match format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "applied": true,
                        "updated_count": reconciled.updated_count,
                        "changes": reconciled.changes,
                        "output": path.display().to_string(),
                    });
                    print_json(output, nested_report)?;
                }
                OutputFormat::Tsv => {
                    println!("test_name\tfield\tprevious\tcurrent");
                    for change in &reconciled.changes {
                        println!(
                            "{}\t{}\t{}\t{}",
                            change.test_name,
                            change.field,
                            change.previous.as_deref().unwrap_or(""),
                            change.current
                        );
                    }
                }
                OutputFormat::Text => {
                    if verbose {
                        for change in &reconciled.changes {
                            println!("{change}");
                        }
                    }
                    println!("Updated {} fields", reconciled.updated_count);
                    println!("Updated results saved to: {}", path.display());
                }
            }
        }
        (outcome, _) => {
            let message = outcome.message().unwrap_or_default();
            match format {
                OutputFormat::Json => {
                    let output = serde_json::json!({ "applied": false, "message": message });
                    print_json(output, nested_report)?;
                }
                OutputFormat::Text | OutputFormat::Tsv => println!("{message}"),
            }
        }
    }

    Ok(())
}

fn print_json(mut output: Value, report: Option<&ValidationReport>) -> anyhow::Result<()> {
    if let Some(report) = report {
        output["report"] = serde_json::to_value(report)?;
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Queue corrections from `--edits` and the per-test flags, in that order
fn queue_edits(args: &ReconcileArgs, edits: &mut EditSet) -> anyhow::Result<()> {
    if let Some(path) = &args.edits {
        let loaded = EditSet::load_from_file(path)
            .with_context(|| format!("Failed to load edit set {}", path.display()))?;
        edits.status_updates.extend(loaded.status_updates);
        edits.unit_updates.extend(loaded.unit_updates);
        edits.date_updates.extend(loaded.date_updates);
    }

    for pair in &args.statuses {
        let (name, value) = split_assignment(pair)?;
        edits.set_status(name, Status::from(value))?;
    }
    for pair in &args.units {
        let (name, value) = split_assignment(pair)?;
        edits.set_unit(name, value);
    }
    for pair in &args.dates {
        let (name, value) = split_assignment(pair)?;
        edits.set_date(name, value);
    }

    Ok(())
}

/// Split `NAME=VALUE` at the last `=`, so test names may contain `=`
fn split_assignment(pair: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = pair
        .rsplit_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected NAME=VALUE, got '{pair}'"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Missing test name in '{pair}'");
    }
    Ok((name, value.trim()))
}
