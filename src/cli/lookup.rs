use std::path::PathBuf;

use clap::Args;

use crate::catalog::index::MatchKind;
use crate::catalog::store::LabCatalog;
use crate::cli::OutputFormat;
use crate::matching::fuzzy::DEFAULT_SIMILARITY_THRESHOLD;
use crate::validation::engine::{NameLookup, RecordValidator, ValidationConfig};

#[derive(Args)]
pub struct LookupArgs {
    /// Reference catalog CSV file
    #[arg(required = true)]
    pub catalog: PathBuf,

    /// Test name to look up
    #[arg(required = true)]
    pub name: String,

    /// Similarity (0-100) a catalog name must exceed to be suggested
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: u8,
}

/// Execute lookup subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: LookupArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = LabCatalog::load_from_file(&args.catalog)?;

    if verbose {
        eprintln!("Loaded catalog with {} entries", catalog.len());
    }
    if !catalog.is_structurally_valid() {
        eprintln!(
            "Warning: Required columns missing in catalog: {}",
            catalog.missing_columns.join(", ")
        );
    }

    let config = ValidationConfig {
        similarity_threshold: args.threshold,
        ..ValidationConfig::default()
    };
    let lookup = RecordValidator::with_config(&catalog, config).lookup(&args.name);

    match format {
        OutputFormat::Text => print_text_lookup(&lookup),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lookup)?),
        OutputFormat::Tsv => print_tsv_lookup(&lookup),
    }

    Ok(())
}

fn print_text_lookup(lookup: &NameLookup) {
    println!("Name: {}", lookup.name);

    if let Some(found) = &lookup.matched {
        let how = match found.kind {
            MatchKind::Exact => "exact Test Name",
            MatchKind::SearchName => "Search Names",
        };
        println!(
            "Matched: {} (row {}, by {how})",
            found.test_name.as_deref().unwrap_or("N/A"),
            found.row + 1
        );
        println!(
            "Calculated range: {}",
            found.calculated_range.as_deref().unwrap_or("N/A")
        );
        println!("Loinc: {}", found.loinc.as_deref().unwrap_or("N/A"));
        println!("Unit: {}", found.unit.as_deref().unwrap_or("N/A"));
    } else {
        println!("Matched: none");
    }

    if let Some(suggestion) = &lookup.suggestion {
        println!("\n{suggestion}");
    }
}

fn print_tsv_lookup(lookup: &NameLookup) {
    println!("name\tmatched\tmatch_kind\trow\tcalculated_range\tloinc\tunit\tsuggestion");
    let found = lookup.matched.as_ref();
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        lookup.name,
        found.and_then(|f| f.test_name.as_deref()).unwrap_or(""),
        found.map_or("", |f| match f.kind {
            MatchKind::Exact => "exact",
            MatchKind::SearchName => "search_name",
        }),
        found.map_or(String::new(), |f| (f.row + 1).to_string()),
        found.and_then(|f| f.calculated_range.as_deref()).unwrap_or(""),
        found.and_then(|f| f.loinc.as_deref()).unwrap_or(""),
        found.and_then(|f| f.unit.as_deref()).unwrap_or(""),
        lookup
            .suggestion
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    );
}
