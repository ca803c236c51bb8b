//! # lab-reconcile
//!
//! A library for checking lab test results against a reference catalog and
//! merging reviewer corrections back into the results.
//!
//! Lab exports arrive with test names that drift from the catalog ("Gluc",
//! "Blood Sugar", "Glucoze"), LOINC codes that disagree with the catalog,
//! missing statuses, and units that need manual conversion. `lab-reconcile`
//! finds these problems, proposes catalog updates for names it cannot place,
//! and applies a reviewer's status, unit and date corrections.
//!
//! ## Features
//!
//! - **Exact and search-name lookup**: case-insensitive, first row wins
//! - **Fuzzy suggestions**: Levenshtein similarity for unmatched names
//! - **LOINC checks**: flags codes that differ from the catalog
//! - **Review rows**: unknown statuses with expected range, units to convert, dates
//! - **Idempotent reconciliation**: only edited fields change; everything else
//!   is written back as it was read
//!
//! ## Example
//!
//! ```rust,no_run
//! use lab_reconcile::{reconcile, EditSet, LabCatalog, ObservationDocument, RecordValidator, Status};
//! use lab_reconcile::parsing::observations::LoadOptions;
//! use std::path::Path;
//!
//! let catalog = LabCatalog::load_from_file(Path::new("catalog.csv")).unwrap();
//! let document =
//!     ObservationDocument::load_from_file(Path::new("results.json"), &LoadOptions::default())
//!         .unwrap();
//!
//! let report = RecordValidator::new(&catalog).validate(&document.observations);
//! for issue in &report.status_issues {
//!     println!("{issue}");
//! }
//!
//! let mut edits = EditSet::new();
//! edits.set_status("Glucose", Status::InRange).unwrap();
//! let outcome = reconcile(document.observations, &edits);
//! println!("updated {} fields", outcome.updated_count());
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Reference catalog storage and name lookup
//! - [`core`]: Observations, statuses, and the edit set
//! - [`matching`]: Similarity scoring and fuzzy matching
//! - [`parsing`]: CSV and observation document readers
//! - [`validation`]: Record checks and the validation report
//! - [`reconcile`]: Merging edits, saving, and the review session
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON API server

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod reconcile;
pub mod utils;
pub mod validation;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::store::{CatalogEntry, LabCatalog};
pub use core::edits::EditSet;
pub use core::observation::Observation;
pub use core::types::*;
pub use matching::fuzzy::{find_closest, FuzzyMatch, FuzzyMatcher};
pub use parsing::observations::ObservationDocument;
pub use reconcile::{reconcile, ReconcileOutcome, ReviewSession};
pub use validation::{RecordValidator, ValidationConfig, ValidationReport};
