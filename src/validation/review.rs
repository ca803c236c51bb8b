use serde::Serialize;

/// Shown when no catalog row matches an observation
pub const RANGE_NOT_FOUND: &str = "Not found";

/// Shown when a value is absent
pub const NOT_AVAILABLE: &str = "N/A";

/// An `unknown` status awaiting a reviewer's choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReviewRow {
    pub test_name: String,
    pub current_status: String,

    /// Expected range from the matched catalog row
    pub calculated_range: Option<String>,

    /// Catalog test the range came from
    pub matched_test: Option<String>,

    /// Result value, for display only
    pub result: Option<String>,
}

impl StatusReviewRow {
    /// Range as shown to a reviewer
    #[must_use]
    pub fn range_display(&self) -> &str {
        match (&self.matched_test, &self.calculated_range) {
            (_, Some(range)) => range,
            (Some(_), None) => NOT_AVAILABLE,
            (None, None) => RANGE_NOT_FOUND,
        }
    }
}

/// A unit flagged for manual conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReviewRow {
    pub test_name: String,
    pub current_unit: String,
}

/// An observation date offered for per-row or bulk override
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateReviewRow {
    pub test_name: String,
    pub current_date: Option<String>,
}

impl DateReviewRow {
    #[must_use]
    pub fn date_display(&self) -> &str {
        self.current_date.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// Review-ready rows for the three editable dimensions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewRows {
    pub status: Vec<StatusReviewRow>,
    pub unit: Vec<UnitReviewRow>,
    pub date: Vec<DateReviewRow>,
}
