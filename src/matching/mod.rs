//! Fuzzy name matching against the catalog.
//!
//! - [`FuzzyMatcher`]: finds the closest catalog name for an unmatched test
//! - [`similarity_ratio`]: the integer similarity percentage used for ranking
//!
//! ## Candidate Pool
//!
//! Candidates are every catalog `Test Name`, followed by every alternate name
//! obtained by splitting `Search Names` on commas, deduplicated by first
//! occurrence. A candidate is eligible only when its similarity to the query
//! is strictly above the threshold (50 by default).
//!
//! ## Example
//!
//! ```rust,no_run
//! use lab_reconcile::catalog::store::{CatalogEntry, LabCatalog};
//! use lab_reconcile::matching::FuzzyMatcher;
//!
//! let catalog: LabCatalog = vec![CatalogEntry::new("Glucose")].into_iter().collect();
//! let found = FuzzyMatcher::new(&catalog).find_closest("Glucoze");
//! println!("{:?} ({}%)", found.candidate, found.score);
//! ```
//!
//! [`similarity_ratio`]: scoring::similarity_ratio

pub mod fuzzy;
pub mod scoring;

pub use fuzzy::{find_closest, FuzzyMatch, FuzzyMatcher};
