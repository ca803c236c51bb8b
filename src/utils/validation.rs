//! Centralized validation and helper functions.

/// Maximum number of data rows accepted from a catalog file (DOS protection)
pub const MAX_CATALOG_ROWS: usize = 100_000;

/// Maximum number of observations accepted from one document (DOS protection)
pub const MAX_OBSERVATIONS: usize = 100_000;

/// Check if adding another row would exceed `max`.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_row_limit(count: usize, max: usize) -> Option<String> {
    if count >= max {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {max}"
        ))
    } else {
        None
    }
}

/// Case-insensitive literal substring test.
///
/// The needle is never treated as a pattern, so `(`, `+` or `.` only match
/// themselves. An empty needle matches nothing.
///
/// # Examples
///
/// ```
/// use lab_reconcile::utils::validation::contains_ignore_case;
///
/// assert!(contains_ignore_case("Gluc, Blood Sugar", "blood sugar"));
/// assert!(contains_ignore_case("Vitamin D (25-OH)", "d (25-oh)"));
/// assert!(!contains_ignore_case("Glucose", ".*"));
/// assert!(!contains_ignore_case("Glucose", ""));
/// ```
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Trim a table cell, mapping blank cells to `None`
#[must_use]
pub fn normalize_cell(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
