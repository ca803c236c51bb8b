//! Readers for the two input sources.
//!
//! - **Catalog CSV**: [`csv::parse_csv_text`] splits quoted CSV into a header
//!   row and data rows
//! - **Observation JSON**: [`observations::ObservationDocument`] extracts the
//!   result collection from a lab export document
//!
//! ## Example
//!
//! ```rust,no_run
//! use lab_reconcile::parsing::observations::{LoadOptions, ObservationDocument};
//! use std::path::Path;
//!
//! let document =
//!     ObservationDocument::load_from_file(Path::new("results.json"), &LoadOptions::default())
//!         .unwrap();
//! for message in &document.messages {
//!     eprintln!("{message}");
//! }
//! ```
//!
//! ## Observation Fields
//!
//! | Field | Use | Required |
//! |-------|-----|----------|
//! | TestName | Catalog lookup and edit key | No (reported as `unknown`) |
//! | status | Status check, editable | No |
//! | unit | Conversion check, editable | No |
//! | date | Date review, editable | No |
//! | loincCode | Compared with the catalog | No |
//! | result | Shown to reviewers | No |

pub mod csv;
pub mod observations;
