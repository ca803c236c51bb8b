use serde::Serialize;
use std::fmt;

use crate::catalog::index::MatchKind;

/// Render an optional value the way reviewers see it in reports
fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("None")
}

/// What is wrong with an observation's status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusProblem {
    /// Status is JSON null or absent
    Null,
    /// Status is the literal `unknown`
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusIssue {
    pub test_name: String,
    pub problem: StatusProblem,
}

impl fmt::Display for StatusIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            StatusProblem::Null => write!(f, "TestName: {} - Status is null", self.test_name),
            StatusProblem::Unknown => {
                write!(f, "TestName: {} - Status is 'unknown'", self.test_name)
            }
        }
    }
}

/// Why a test name could not be matched to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// Neither an exact test name nor a search-name substring
    NotInCatalog,
    /// The observation has no usable `TestName`
    MissingTestName,
    /// The catalog lacks required columns, so nothing can match
    CatalogColumnsMissing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedTest {
    pub test_name: String,
    pub reason: UnmatchedReason,
}

impl fmt::Display for UnmatchedTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            UnmatchedReason::NotInCatalog => "Not found in catalog Test Name or Search Names",
            UnmatchedReason::MissingTestName => "Missing TestName",
            UnmatchedReason::CatalogColumnsMissing => "Required columns missing in catalog",
        };
        write!(f, "TestName: {} - {}", self.test_name, reason)
    }
}

/// An observation whose LOINC code disagrees with its catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodingIssue {
    pub test_name: String,

    /// Catalog test the observation was matched to
    pub matched_test: Option<String>,

    pub match_kind: MatchKind,

    /// LOINC code from the catalog
    pub expected: Option<String>,

    /// LOINC code from the observation
    pub found: Option<String>,
}

impl fmt::Display for CodingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TestName: {} - Incorrect loincCode. Expected: {}, Found: {}",
            self.test_name,
            or_none(self.expected.as_deref()),
            or_none(self.found.as_deref())
        )
    }
}

/// Proposed catalog change for an unmatched test name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogSuggestion {
    /// Add the name to an existing row's search names
    AddSearchName {
        test_name: String,
        catalog_test: String,
        closest_match: String,
        similarity: u8,
    },
    /// A similar name exists but cannot be attributed to a row
    NoClearTestName {
        test_name: String,
        closest_match: String,
        similarity: u8,
    },
    /// Nothing similar exists; a new or related entry is needed
    NewEntry { test_name: String },
}

impl CatalogSuggestion {
    #[must_use]
    pub fn test_name(&self) -> &str {
        match self {
            Self::AddSearchName { test_name, .. }
            | Self::NoClearTestName { test_name, .. }
            | Self::NewEntry { test_name } => test_name,
        }
    }
}

impl fmt::Display for CatalogSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddSearchName {
                test_name,
                catalog_test,
                similarity,
                ..
            } => write!(
                f,
                "Suggest adding '{test_name}' to Search Names for Test Name: {catalog_test} (Similarity: {similarity}%)"
            ),
            Self::NoClearTestName {
                test_name,
                closest_match,
                similarity,
            } => write!(
                f,
                "No clear Test Name found for closest match '{closest_match}'. Suggest adding '{test_name}' to a new or related test (Similarity: {similarity}%)"
            ),
            Self::NewEntry { test_name } => write!(
                f,
                "No similar test found for '{test_name}'. Suggest adding '{test_name}' to a new or related test in the catalog."
            ),
        }
    }
}
