use serde::Serialize;

use crate::utils::validation::contains_ignore_case;

use super::store::{CatalogEntry, LabCatalog};

/// How a name was resolved to a catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Case-insensitive equality with the row's test name
    Exact,
    /// Case-insensitive substring of the row's search names
    SearchName,
}

/// A catalog row found for a name
#[derive(Debug, Clone, Copy)]
pub struct CatalogMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub row: usize,
    pub kind: MatchKind,
}

/// Name lookups over a catalog.
///
/// Every lookup answers "not found" when the catalog is missing required
/// columns. Ties always go to the first row in catalog order.
pub struct CatalogIndex<'a> {
    catalog: &'a LabCatalog,
}

impl<'a> CatalogIndex<'a> {
    pub fn new(catalog: &'a LabCatalog) -> Self {
        Self { catalog }
    }

    /// First row whose test name equals `name`, ignoring case
    #[must_use]
    pub fn lookup_exact(&self, name: &str) -> Option<CatalogMatch<'a>> {
        if !self.catalog.is_structurally_valid() {
            return None;
        }
        let row = self.catalog.row_for_name(&name.to_lowercase())?;
        Some(CatalogMatch {
            entry: &self.catalog.entries[row],
            row,
            kind: MatchKind::Exact,
        })
    }

    /// First row whose raw search names contain `name` as a literal,
    /// case-insensitive substring
    #[must_use]
    pub fn lookup_by_search_name(&self, name: &str) -> Option<CatalogMatch<'a>> {
        if !self.catalog.is_structurally_valid() {
            return None;
        }
        self.first_row(|entry| {
            entry
                .search_names
                .as_deref()
                .is_some_and(|names| contains_ignore_case(names, name))
        })
        .map(|(row, entry)| CatalogMatch {
            entry,
            row,
            kind: MatchKind::SearchName,
        })
    }

    /// Exact match, falling back to search names
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<CatalogMatch<'a>> {
        self.lookup_exact(name)
            .or_else(|| self.lookup_by_search_name(name))
    }

    /// Attribute a fuzzy candidate to the first row whose test name or search
    /// names contain it
    #[must_use]
    pub fn resolve_candidate(&self, candidate: &str) -> Option<&'a CatalogEntry> {
        if !self.catalog.is_structurally_valid() {
            return None;
        }
        self.first_row(|entry| {
            entry
                .test_name
                .as_deref()
                .is_some_and(|name| contains_ignore_case(name, candidate))
                || entry
                    .search_names
                    .as_deref()
                    .is_some_and(|names| contains_ignore_case(names, candidate))
        })
        .map(|(_, entry)| entry)
    }

    fn first_row<F>(&self, predicate: F) -> Option<(usize, &'a CatalogEntry)>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        self.catalog
            .entries
            .iter()
            .enumerate()
            .find(|(_, entry)| predicate(entry))
    }
}
