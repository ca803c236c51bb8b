use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::matching::fuzzy::DEFAULT_SIMILARITY_THRESHOLD;
use crate::parsing::observations::{LoadOptions, DEFAULT_COLLECTION_KEY};
use crate::reconcile::session::ReviewSession;
use crate::validation::engine::{ValidationConfig, ValidationReport, CONVERSION_REQUIRED_MARKER};

#[derive(Args)]
pub struct ValidateArgs {
    /// Lab results JSON file
    #[arg(required = true)]
    pub observations: PathBuf,

    /// Reference catalog CSV file
    #[arg(required = true)]
    pub catalog: PathBuf,

    #[command(flatten)]
    pub options: ValidationOptions,
}

/// Options shared by every command that validates
#[derive(Args, Clone)]
pub struct ValidationOptions {
    /// Key holding the results array in the JSON document
    #[arg(long, default_value = DEFAULT_COLLECTION_KEY)]
    pub collection: String,

    /// Similarity (0-100) a catalog name must exceed to be suggested
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: u8,

    /// Unit text that flags a result for manual conversion
    #[arg(long, default_value = CONVERSION_REQUIRED_MARKER)]
    pub conversion_marker: String,
}

impl ValidationOptions {
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            collection_key: self.collection.clone(),
        }
    }

    #[must_use]
    pub fn config(&self) -> ValidationConfig {
        ValidationConfig {
            similarity_threshold: self.threshold,
            conversion_marker: self.conversion_marker.clone(),
        }
    }
}

/// Execute validate subcommand
///
/// Load problems are reported as messages, not errors.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ValidateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut session = ReviewSession::load(
        &args.observations,
        &args.catalog,
        &args.options.load_options(),
        args.options.config(),
    );

    if verbose {
        if let Some(catalog) = session.catalog() {
            eprintln!("Loaded catalog with {} entries", catalog.len());
        }
    }

    let report = session.validate();
    print_report(&report, format)
}

/// Print a report in the requested format
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub fn print_report(report: &ValidationReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text_report(report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Tsv => print!("{}", render_tsv_report(report)),
    }
    Ok(())
}

/// Human-readable report: summary counts, one section per finding type,
/// then the review rows
#[must_use]
pub fn render_text_report(report: &ValidationReport) -> String {
    let mut out = String::new();

    for message in &report.messages {
        let _ = writeln!(out, "{message}");
    }
    if !report.messages.is_empty() {
        out.push('\n');
    }

    let summary = report.summary();
    out.push_str("Lab Data Validation Report\n\n");
    out.push_str("Summary\n");
    let _ = writeln!(out, "Total Tests Processed: {}", summary.total_observations);
    let _ = writeln!(out, "Status Issues: {}", summary.status_issues);
    let _ = writeln!(out, "Unmatched Test Names: {}", summary.unmatched_tests);
    let _ = writeln!(out, "Loinc Validation Issues: {}", summary.coding_issues);
    let _ = writeln!(out, "Catalog Update Suggestions: {}", summary.suggestions);
    let _ = writeln!(out, "Units Requiring Conversion: {}\n", summary.units_to_convert);

    write_section(&mut out, "Status Issues", &report.status_issues, "No issues found");
    write_section(
        &mut out,
        "Unmatched Test Names",
        &report.unmatched_tests,
        "No unmatched Test Names found",
    );
    write_section(
        &mut out,
        "Loinc Validation Issues",
        &report.coding_issues,
        "No Loinc issues found",
    );
    write_section(
        &mut out,
        "Catalog Update Suggestions",
        &report.suggestions,
        "No catalog update suggestions",
    );

    if !report.review.status.is_empty() {
        out.push_str("Status Review\n");
        for row in &report.review.status {
            let _ = writeln!(
                out,
                "{}\tstatus: {}\tresult: {}\trange: {}",
                row.test_name,
                row.current_status,
                row.result.as_deref().unwrap_or("N/A"),
                row.range_display()
            );
        }
        out.push('\n');
    }

    if !report.review.unit.is_empty() {
        out.push_str("Unit Review\n");
        for row in &report.review.unit {
            let _ = writeln!(out, "{}\tunit: {}", row.test_name, row.current_unit);
        }
        out.push('\n');
    }

    out
}

fn write_section<T: std::fmt::Display>(out: &mut String, title: &str, items: &[T], empty: &str) {
    let _ = writeln!(out, "{title}");
    if items.is_empty() {
        let _ = writeln!(out, "{empty}");
    } else {
        for item in items {
            let _ = writeln!(out, "{item}");
        }
    }
    out.push('\n');
}

/// One line per finding: `kind`, `test_name`, `detail`
#[must_use]
pub fn render_tsv_report(report: &ValidationReport) -> String {
    let mut out = String::from("kind\ttest_name\tdetail\n");

    for issue in &report.status_issues {
        let _ = writeln!(out, "status\t{}\t{}", issue.test_name, issue);
    }
    for test in &report.unmatched_tests {
        let _ = writeln!(out, "unmatched\t{}\t{}", test.test_name, test);
    }
    for issue in &report.coding_issues {
        let _ = writeln!(out, "loinc\t{}\t{}", issue.test_name, issue);
    }
    for suggestion in &report.suggestions {
        let _ = writeln!(out, "suggestion\t{}\t{}", suggestion.test_name(), suggestion);
    }
    for row in &report.review.unit {
        let _ = writeln!(out, "unit\t{}\t{}", row.test_name, row.current_unit);
    }
    for message in &report.messages {
        let _ = writeln!(out, "message\t\t{message}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::{CatalogEntry, LabCatalog};
    use crate::core::observation::Observation;
    use crate::validation::engine::RecordValidator;

    fn make_report() -> ValidationReport {
        let catalog: LabCatalog = vec![CatalogEntry::new("Glucose")
            .with_search_names("Gluc")
            .with_calculated_range("70-100")
            .with_loinc("2345-7")]
        .into_iter()
        .collect();
        RecordValidator::new(&catalog).validate(&[
            Observation::new("Glucose")
                .with_status("unknown")
                .with_loinc_code("2345-7"),
            Observation::new("Xyzzy123").with_status("inRange"),
        ])
    }

    #[test]
    fn test_text_report_sections() {
        let text = render_text_report(&make_report());
        assert!(text.starts_with("Lab Data Validation Report"));
        assert!(text.contains("Total Tests Processed: 2"));
        assert!(text.contains("TestName: Glucose - Status is 'unknown'"));
        assert!(text.contains("No Loinc issues found"));
        assert!(text.contains("No similar test found for 'Xyzzy123'"));
        assert!(text.contains("Glucose\tstatus: unknown\tresult: N/A\trange: 70-100"));
    }

    #[test]
    fn test_text_report_messages_first() {
        let report = ValidationReport::with_messages(vec!["Error loading CSV x".into()]);
        let text = render_text_report(&report);
        assert!(text.starts_with("Error loading CSV x\n"));
        assert!(text.contains("No issues found"));
    }

    #[test]
    fn test_tsv_report() {
        let tsv = render_tsv_report(&make_report());
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "kind\ttest_name\tdetail");
        assert!(lines.iter().any(|l| l.starts_with("unmatched\tXyzzy123\t")));
        assert!(lines.iter().any(|l| l.starts_with("suggestion\tXyzzy123\t")));
    }
}
