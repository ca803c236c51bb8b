use serde::Serialize;

use crate::catalog::store::LabCatalog;
use crate::matching::scoring::similarity_ratio;

/// Default similarity a candidate must exceed to count as a match
pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 50;

/// Closest catalog name found for a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzyMatch {
    /// The winning candidate, if any exceeded the threshold
    pub candidate: Option<String>,

    /// Similarity percentage of the winner, 0 when there is none
    pub score: u8,
}

impl FuzzyMatch {
    #[must_use]
    pub fn none() -> Self {
        Self {
            candidate: None,
            score: 0,
        }
    }
}

/// Finds the most similar catalog name for names that failed exact and
/// search-name lookup
pub struct FuzzyMatcher<'a> {
    catalog: &'a LabCatalog,
    threshold: u8,
}

impl<'a> FuzzyMatcher<'a> {
    /// Create a matcher with the default threshold
    pub fn new(catalog: &'a LabCatalog) -> Self {
        Self::with_threshold(catalog, DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn with_threshold(catalog: &'a LabCatalog, threshold: u8) -> Self {
        Self { catalog, threshold }
    }

    /// Closest candidate by similarity ratio on lowercased strings.
    ///
    /// Only scores strictly above the threshold are eligible. The strictly
    /// highest score wins, so ties keep the earliest candidate in pool order
    /// (test names in row order, then search-name tokens in row order).
    #[must_use]
    pub fn find_closest(&self, name: &str) -> FuzzyMatch {
        let query = name.to_lowercase();
        let mut best = FuzzyMatch::none();

        for candidate in self.catalog.candidates() {
            let score = similarity_ratio(&query, &candidate.to_lowercase());
            if score > best.score && score > self.threshold {
                best = FuzzyMatch {
                    candidate: Some(candidate.to_string()),
                    score,
                };
            }
        }

        tracing::debug!(
            "Closest match for {}: {:?} ({}%)",
            name,
            best.candidate,
            best.score
        );
        best
    }
}

/// Closest catalog name for `name` using the default threshold
#[must_use]
pub fn find_closest(name: &str, catalog: &LabCatalog) -> FuzzyMatch {
    FuzzyMatcher::new(catalog).find_closest(name)
}
