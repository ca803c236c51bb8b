//! Record validation: finds data issues in observations and proposes
//! catalog updates.
//!
//! Four independent checks run per observation:
//!
//! | Check | Output |
//! |-------|--------|
//! | Status null or `unknown` | [`StatusIssue`], plus a status review row for `unknown` |
//! | Unit contains the conversion marker | unit review row |
//! | Date | a date review row for every observation |
//! | Name and LOINC code | [`CodingIssue`], or [`UnmatchedTest`] with a [`CatalogSuggestion`] |

pub mod engine;
pub mod issues;
pub mod review;

pub use engine::{
    LookupMatch, NameLookup, RecordValidator, ReportSummary, ValidationConfig, ValidationReport,
};
pub use issues::{CatalogSuggestion, CodingIssue, StatusIssue, UnmatchedTest};
