//! Reference catalog storage and indexing.
//!
//! The catalog maps canonical lab test names to their alternate names,
//! expected reference ranges, LOINC codes, and units. It is loaded from a CSV
//! file whose header carries at least these columns:
//!
//! | Column             | Required | Use                                   |
//! |--------------------|----------|---------------------------------------|
//! | `Test Name`        | Yes      | Exact lookup, fuzzy candidates        |
//! | `Search Names`     | Yes      | Substring lookup, fuzzy candidates    |
//! | `Calculated range` | Yes      | Shown to reviewers for status review  |
//! | `Unit`             | Yes      | Loaded only                           |
//! | `Loinc`            | No       | Expected LOINC code                   |
//!
//! A catalog missing a required column still loads, but records the missing
//! columns and answers every lookup with "not found".
//!
//! ## Example
//!
//! ```rust,no_run
//! use lab_reconcile::LabCatalog;
//! use std::path::Path;
//!
//! let catalog = LabCatalog::load_from_file(Path::new("catalog.csv")).unwrap();
//! if let Some(found) = catalog.index().lookup("Blood Sugar") {
//!     println!("{:?} ({:?})", found.entry.test_name, found.kind);
//! }
//! ```

pub mod index;
pub mod store;
