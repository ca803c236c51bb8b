use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::index::CatalogIndex;
use crate::parsing::csv::{parse_csv_text, ParseError, Table};
use crate::utils::validation::normalize_cell;

pub const TEST_NAME_COLUMN: &str = "Test Name";
pub const SEARCH_NAMES_COLUMN: &str = "Search Names";
pub const CALCULATED_RANGE_COLUMN: &str = "Calculated range";
pub const UNIT_COLUMN: &str = "Unit";
pub const LOINC_COLUMN: &str = "Loinc";

/// Columns a catalog must have for lookups to run
pub const REQUIRED_COLUMNS: [&str; 4] = [
    TEST_NAME_COLUMN,
    SEARCH_NAMES_COLUMN,
    CALCULATED_RANGE_COLUMN,
    UNIT_COLUMN,
];

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] ParseError),
}

/// One row of the reference catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical test name
    pub test_name: Option<String>,

    /// Alternate names, comma-delimited as in the source file
    pub search_names: Option<String>,

    /// Expected reference range for display
    pub calculated_range: Option<String>,

    /// Expected LOINC code
    pub loinc: Option<String>,

    /// Reference unit (loaded but not used by validation)
    pub unit: Option<String>,
}

impl CatalogEntry {
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: Some(test_name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_search_names(mut self, search_names: impl Into<String>) -> Self {
        self.search_names = Some(search_names.into());
        self
    }

    #[must_use]
    pub fn with_calculated_range(mut self, range: impl Into<String>) -> Self {
        self.calculated_range = Some(range.into());
        self
    }

    #[must_use]
    pub fn with_loinc(mut self, loinc: impl Into<String>) -> Self {
        self.loinc = Some(loinc.into());
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Individual alternate names: split on commas, trimmed, blanks dropped
    pub fn search_name_tokens(&self) -> impl Iterator<Item = &str> {
        self.search_names
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// The reference catalog with lookup indexes
#[derive(Debug, Clone, Default)]
pub struct LabCatalog {
    /// All rows, in file order
    pub entries: Vec<CatalogEntry>,

    /// Required columns absent from the source header
    pub missing_columns: Vec<String>,

    /// Index: lowercased test name -> first row carrying it
    name_to_index: HashMap<String, usize>,

    /// Fuzzy candidates from test names, first occurrence order
    name_candidates: Vec<String>,

    /// Fuzzy candidates from search-name tokens not already a test name
    token_candidates: Vec<String>,

    seen_names: HashSet<String>,
    seen_tokens: HashSet<String>,
}

impl LabCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a CSV file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` if the file cannot be read, or
    /// `CatalogError::ParseError` if it is empty or malformed.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_csv(&content)?;
        info!(
            "Loaded catalog with {} entries from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from CSV text
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if the text is empty or malformed.
    pub fn from_csv(csv: &str) -> Result<Self, CatalogError> {
        let table = parse_csv_text(csv, ',')?;
        Ok(Self::from_table(&table))
    }

    /// Build a catalog from a parsed table.
    ///
    /// Missing required columns are recorded rather than rejected; such a
    /// catalog answers every lookup with "not found".
    pub fn from_table(table: &Table) -> Self {
        let mut catalog = Self::new();

        catalog.missing_columns = REQUIRED_COLUMNS
            .iter()
            .filter(|column| table.column(column).is_none())
            .map(|column| (*column).to_string())
            .collect();

        if !catalog.missing_columns.is_empty() {
            warn!(
                "Required columns missing in catalog: {:?}. Available columns: {:?}",
                catalog.missing_columns, table.headers
            );
        }

        let test_name = table.column(TEST_NAME_COLUMN);
        let search_names = table.column(SEARCH_NAMES_COLUMN);
        let calculated_range = table.column(CALCULATED_RANGE_COLUMN);
        let loinc = table.column(LOINC_COLUMN);
        let unit = table.column(UNIT_COLUMN);

        let cell = |row: usize, column: Option<usize>| {
            column.and_then(|c| normalize_cell(table.cell(row, c)))
        };

        for row in 0..table.rows.len() {
            catalog.add_entry(CatalogEntry {
                test_name: cell(row, test_name),
                search_names: cell(row, search_names),
                calculated_range: cell(row, calculated_range),
                loinc: cell(row, loinc),
                unit: cell(row, unit),
            });
        }

        catalog
    }

    /// Add an entry to the catalog
    pub fn add_entry(&mut self, entry: CatalogEntry) {
        let index = self.entries.len();

        if let Some(name) = &entry.test_name {
            self.name_to_index
                .entry(name.to_lowercase())
                .or_insert(index);

            if self.seen_names.insert(name.clone()) {
                self.name_candidates.push(name.clone());
                // Test names precede tokens in the candidate pool
                if self.seen_tokens.remove(name) {
                    self.token_candidates.retain(|token| token != name);
                }
            }
        }

        for token in entry.search_name_tokens() {
            if !self.seen_names.contains(token) && self.seen_tokens.insert(token.to_string()) {
                self.token_candidates.push(token.to_string());
            }
        }

        self.entries.push(entry);
    }

    /// Lookup interface over this catalog
    #[must_use]
    pub fn index(&self) -> CatalogIndex<'_> {
        CatalogIndex::new(self)
    }

    /// Row index of the first entry whose test name equals `lowercase_name`
    pub(crate) fn row_for_name(&self, lowercase_name: &str) -> Option<usize> {
        self.name_to_index.get(lowercase_name).copied()
    }

    /// Fuzzy-match candidates: test names, then search-name tokens, deduplicated
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.name_candidates
            .iter()
            .chain(&self.token_candidates)
            .map(String::as_str)
    }

    /// True if every required column was present
    #[must_use]
    pub fn is_structurally_valid(&self) -> bool {
        self.missing_columns.is_empty()
    }

    /// Number of entries in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<CatalogEntry> for LabCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for entry in iter {
            catalog.add_entry(entry);
        }
        catalog
    }
}
