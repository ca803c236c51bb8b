use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::index::{CatalogIndex, MatchKind};
use crate::catalog::store::LabCatalog;
use crate::core::observation::Observation;
use crate::core::types::Status;
use crate::matching::fuzzy::{FuzzyMatcher, DEFAULT_SIMILARITY_THRESHOLD};
use crate::validation::issues::{
    CatalogSuggestion, CodingIssue, StatusIssue, StatusProblem, UnmatchedReason, UnmatchedTest,
};
use crate::validation::review::{DateReviewRow, ReviewRows, StatusReviewRow, UnitReviewRow};

/// Unit text marking a result that needs manual conversion
pub const CONVERSION_REQUIRED_MARKER: &str = "CONVERSION REQUIRED!!!";

/// Configuration for the record validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Similarity a fuzzy candidate must exceed to be suggested
    pub similarity_threshold: u8,

    /// Unit substring that flags a row for conversion review
    pub conversion_marker: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            conversion_marker: CONVERSION_REQUIRED_MARKER.to_string(),
        }
    }
}

/// Counts shown at the top of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_observations: usize,
    pub status_issues: usize,
    pub unmatched_tests: usize,
    pub coding_issues: usize,
    pub suggestions: usize,
    pub units_to_convert: usize,
}

/// Everything one validation run found
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// When the report was produced (RFC 3339)
    pub generated_at: String,

    pub total_observations: usize,
    pub status_issues: Vec<StatusIssue>,
    pub unmatched_tests: Vec<UnmatchedTest>,
    pub coding_issues: Vec<CodingIssue>,
    pub suggestions: Vec<CatalogSuggestion>,
    pub review: ReviewRows,

    /// Load errors and warnings carried alongside the findings
    pub messages: Vec<String>,
}

impl ValidationReport {
    /// A report with no findings
    #[must_use]
    pub fn empty() -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total_observations: 0,
            status_issues: Vec::new(),
            unmatched_tests: Vec::new(),
            coding_issues: Vec::new(),
            suggestions: Vec::new(),
            review: ReviewRows::default(),
            messages: Vec::new(),
        }
    }

    /// An empty report explaining why validation could not run
    #[must_use]
    pub fn with_messages(messages: Vec<String>) -> Self {
        Self {
            messages,
            ..Self::empty()
        }
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_observations: self.total_observations,
            status_issues: self.status_issues.len(),
            unmatched_tests: self.unmatched_tests.len(),
            coding_issues: self.coding_issues.len(),
            suggestions: self.suggestions.len(),
            units_to_convert: self.review.unit.len(),
        }
    }
}

/// Catalog row a single name resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupMatch {
    pub row: usize,
    pub kind: MatchKind,
    pub test_name: Option<String>,
    pub calculated_range: Option<String>,
    pub loinc: Option<String>,
    pub unit: Option<String>,
}

/// How one name resolves: a catalog row, or a suggestion when none matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameLookup {
    pub name: String,
    pub matched: Option<LookupMatch>,
    pub suggestion: Option<CatalogSuggestion>,
}

/// Checks observations against a catalog.
///
/// Every check reads the observations only; nothing is mutated.
pub struct RecordValidator<'a> {
    catalog: &'a LabCatalog,
    index: CatalogIndex<'a>,
    config: ValidationConfig,
}

impl<'a> RecordValidator<'a> {
    /// Create a validator with default configuration
    pub fn new(catalog: &'a LabCatalog) -> Self {
        Self::with_config(catalog, ValidationConfig::default())
    }

    pub fn with_config(catalog: &'a LabCatalog, config: ValidationConfig) -> Self {
        Self {
            catalog,
            index: catalog.index(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Run every check over the observations, in input order
    #[must_use]
    pub fn validate(&self, observations: &[Observation]) -> ValidationReport {
        let mut report = ValidationReport::empty();
        report.total_observations = observations.len();

        if !self.catalog.is_structurally_valid() {
            report.messages.push(format!(
                "Required columns missing in catalog: {}",
                self.catalog.missing_columns.join(", ")
            ));
        }

        for observation in observations {
            debug!("Checking TestName: {}", observation.display_name());
            self.check_status(observation, &mut report);
            self.check_unit(observation, &mut report);
            self.check_date(observation, &mut report);
            self.check_name_and_coding(observation, &mut report);
        }

        debug!(
            "Validated {} observations: {:?}",
            observations.len(),
            report.summary()
        );
        report
    }

    fn check_status(&self, observation: &Observation, report: &mut ValidationReport) {
        let test_name = observation.display_name().to_string();

        match observation.status() {
            None => report.status_issues.push(StatusIssue {
                test_name,
                problem: StatusProblem::Null,
            }),
            Some(Status::Unknown) => {
                let found = observation
                    .test_name()
                    .and_then(|name| self.index.lookup(name));

                report.review.status.push(StatusReviewRow {
                    test_name: test_name.clone(),
                    current_status: Status::Unknown.to_string(),
                    calculated_range: found.and_then(|m| m.entry.calculated_range.clone()),
                    matched_test: found.and_then(|m| m.entry.test_name.clone()),
                    result: observation.result().map(str::to_string),
                });
                report.status_issues.push(StatusIssue {
                    test_name,
                    problem: StatusProblem::Unknown,
                });
            }
            Some(_) => {}
        }
    }

    fn check_unit(&self, observation: &Observation, report: &mut ValidationReport) {
        if let Some(unit) = observation.unit() {
            if unit.contains(&self.config.conversion_marker) {
                report.review.unit.push(UnitReviewRow {
                    test_name: observation.display_name().to_string(),
                    current_unit: unit.to_string(),
                });
            }
        }
    }

    fn check_date(&self, observation: &Observation, report: &mut ValidationReport) {
        report.review.date.push(DateReviewRow {
            test_name: observation.display_name().to_string(),
            current_date: observation.date().map(str::to_string),
        });
    }

    fn check_name_and_coding(&self, observation: &Observation, report: &mut ValidationReport) {
        let Some(test_name) = observation.test_name() else {
            report.unmatched_tests.push(UnmatchedTest {
                test_name: observation.display_name().to_string(),
                reason: UnmatchedReason::MissingTestName,
            });
            return;
        };

        if !self.catalog.is_structurally_valid() {
            report.unmatched_tests.push(UnmatchedTest {
                test_name: test_name.to_string(),
                reason: UnmatchedReason::CatalogColumnsMissing,
            });
            return;
        }

        if let Some(found) = self.index.lookup(test_name) {
            let expected = found.entry.loinc.as_deref().map(str::trim);
            let actual = observation.loinc_code().map(str::trim);
            if expected != actual {
                report.coding_issues.push(CodingIssue {
                    test_name: test_name.to_string(),
                    matched_test: found.entry.test_name.clone(),
                    match_kind: found.kind,
                    expected: expected.map(str::to_string),
                    found: actual.map(str::to_string),
                });
            }
            return;
        }

        report.unmatched_tests.push(UnmatchedTest {
            test_name: test_name.to_string(),
            reason: UnmatchedReason::NotInCatalog,
        });
        report.suggestions.push(self.suggest(test_name));
    }

    /// Resolve one name the way the name check does
    #[must_use]
    pub fn lookup(&self, name: &str) -> NameLookup {
        let matched = self.index.lookup(name).map(|found| LookupMatch {
            row: found.row,
            kind: found.kind,
            test_name: found.entry.test_name.clone(),
            calculated_range: found.entry.calculated_range.clone(),
            loinc: found.entry.loinc.clone(),
            unit: found.entry.unit.clone(),
        });

        let suggestion = if matched.is_none() && self.catalog.is_structurally_valid() {
            Some(self.suggest(name))
        } else {
            None
        };

        NameLookup {
            name: name.to_string(),
            matched,
            suggestion,
        }
    }

    /// Catalog change proposed for a name with no exact or search-name match
    #[must_use]
    pub fn suggest(&self, test_name: &str) -> CatalogSuggestion {
        let closest = FuzzyMatcher::with_threshold(self.catalog, self.config.similarity_threshold)
            .find_closest(test_name);

        let Some(candidate) = closest.candidate else {
            return CatalogSuggestion::NewEntry {
                test_name: test_name.to_string(),
            };
        };

        let catalog_test = self
            .index
            .resolve_candidate(&candidate)
            .and_then(|entry| entry.test_name.clone());

        match catalog_test {
            Some(catalog_test) => CatalogSuggestion::AddSearchName {
                test_name: test_name.to_string(),
                catalog_test,
                closest_match: candidate,
                similarity: closest.score,
            },
            None => CatalogSuggestion::NoClearTestName {
                test_name: test_name.to_string(),
                closest_match: candidate,
                similarity: closest.score,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::CatalogEntry;
    use serde_json::json;

    fn make_test_catalog() -> LabCatalog {
        vec![
            CatalogEntry::new("Glucose")
                .with_search_names("Gluc, Blood Sugar")
                .with_calculated_range("70-100")
                .with_loinc("2345-7")
                .with_unit("mg/dL"),
            CatalogEntry::new("Sodium")
                .with_search_names("Na, Serum Sodium")
                .with_calculated_range("135-145")
                .with_loinc("2951-2")
                .with_unit("mmol/L"),
        ]
        .into_iter()
        .collect()
    }

    fn observation(value: serde_json::Value) -> Observation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_status_carries_range() {
        let catalog = make_test_catalog();
        let report = RecordValidator::new(&catalog).validate(&[observation(json!({
            "TestName": "Glucose",
            "status": "unknown",
            "loincCode": "2345-7",
            "result": 92
        }))]);

        assert_eq!(report.status_issues.len(), 1);
        assert_eq!(report.status_issues[0].problem, StatusProblem::Unknown);

        let row = &report.review.status[0];
        assert_eq!(row.range_display(), "70-100");
        assert_eq!(row.matched_test.as_deref(), Some("Glucose"));
        assert_eq!(row.result.as_deref(), Some("92"));
    }

    #[test]
    fn test_unknown_status_without_match_shows_not_found() {
        let catalog = make_test_catalog();
        let report = RecordValidator::new(&catalog).validate(&[observation(json!({
            "TestName": "Xyzzy123",
            "status": "unknown"
        }))]);
        assert_eq!(report.review.status[0].range_display(), "Not found");
    }

    #[test]
    fn test_null_status() {
        let catalog = make_test_catalog();
        let report = RecordValidator::new(&catalog).validate(&[
            observation(json!({"TestName": "Sodium", "status": null, "loincCode": "2951-2"})),
            observation(json!({"TestName": "Glucose", "loincCode": "2345-7"})),
            observation(json!({"TestName": "Glucose", "status": "inRange", "loincCode": "2345-7"})),
        ]);
        assert_eq!(report.status_issues.len(), 2);
        assert!(report
            .status_issues
            .iter()
            .all(|issue| issue.problem == StatusProblem::Null));
        assert!(report.review.status.is_empty());
    }

    #[test]
    fn test_search_name_match_with_wrong_loinc() {
        let catalog = make_test_catalog();
        let report = RecordValidator::new(&catalog).validate(&[observation(json!({
            "TestName": "Gluc",
            "status": "inRange",
            "loincCode": "1111-1"
        }))]);

        assert!(report.unmatched_tests.is_empty());
        let issue = &report.coding_issues[0];
        assert_eq!(issue.match_kind, MatchKind::SearchName);
        assert_eq!(issue.matched_test.as_deref(), Some("Glucose"));
        assert!(issue
            .to_string()
            .ends_with("Expected: 2345-7, Found: 1111-1"));
    }

    #[test]
    fn test_missing_loinc_on_one_side_is_an_issue() {
        let catalog = make_test_catalog();
        let report = RecordValidator::new(&catalog).validate(&[observation(json!({
            "TestName": "Sodium",
            "status": "inRange"
        }))]);
        assert_eq!(report.coding_issues.len(), 1);
        assert_eq!(report.coding_issues[0].found, None);
    }

    #[test]
    fn test_missing_loinc_on_both_sides_is_consistent() {
        let catalog: LabCatalog = vec![CatalogEntry::new("Ferritin")
            .with_search_names("")
            .with_calculated_range("30-400")]
        .into_iter()
        .collect();
        let report = RecordValidator::new(&catalog).validate(&[observation(json!({
            "TestName": "Ferritin",
            "status": "inRange"
        }))]);
        assert!(report.coding_issues.is_empty());
        assert!(report.unmatched_tests.is_empty());
    }

    #[test]
    fn test_unmatched_name_gets_suggestion() {
        let catalog = make_test_catalog();
        let validator = RecordValidator::new(&catalog);
        let report = validator.validate(&[
            observation(json!({"TestName": "Xyzzy123", "status": "inRange"})),
            observation(json!({"TestName": "Sodum", "status": "inRange"})),
        ]);

        assert_eq!(report.unmatched_tests.len(), 2);
        assert_eq!(
            report.suggestions[0],
            CatalogSuggestion::NewEntry {
                test_name: "Xyzzy123".into()
            }
        );
        assert_eq!(
            report.suggestions[1],
            CatalogSuggestion::AddSearchName {
                test_name: "Sodum".into(),
                catalog_test: "Sodium".into(),
                closest_match: "Sodium".into(),
                similarity: 91,
            }
        );
    }

    #[test]
    fn test_suggestion_without_clear_test_name() {
        // Row with search names but no test name: the token is a candidate
        // but cannot be attributed to a named row
        let mut catalog = LabCatalog::new();
        catalog.add_entry(CatalogEntry {
            search_names: Some("Potassium".into()),
            ..CatalogEntry::default()
        });
        let suggestion = RecordValidator::new(&catalog).suggest("Potasium");
        assert!(matches!(
            suggestion,
            CatalogSuggestion::NoClearTestName { ref closest_match, .. } if closest_match == "Potassium"
        ));
    }

    #[test]
    fn test_unit_conversion_flag() {
        let catalog = make_test_catalog();
        let report = RecordValidator::new(&catalog).validate(&[
            observation(json!({
                "TestName": "Glucose",
                "status": "inRange",
                "unit": "mmol/L CONVERSION REQUIRED!!!",
                "loincCode": "2345-7"
            })),
            observation(json!({
                "TestName": "Sodium",
                "status": "inRange",
                "unit": "mmol/L",
                "loincCode": "2951-2"
            })),
        ]);
        assert_eq!(report.review.unit.len(), 1);
        assert_eq!(report.review.unit[0].test_name, "Glucose");
        assert_eq!(report.summary().units_to_convert, 1);
    }

    #[test]
    fn test_every_observation_gets_date_row() {
        let catalog = make_test_catalog();
        let report = RecordValidator::new(&catalog).validate(&[
            observation(json!({"TestName": "Glucose", "date": "2024-01-05"})),
            observation(json!({"TestName": "Sodium"})),
        ]);
        assert_eq!(report.review.date.len(), 2);
        assert_eq!(report.review.date[0].date_display(), "2024-01-05");
        assert_eq!(report.review.date[1].date_display(), "N/A");
    }

    #[test]
    fn test_missing_test_name() {
        let catalog = make_test_catalog();
        let report = RecordValidator::new(&catalog)
            .validate(&[observation(json!({"status": "inRange"}))]);
        assert_eq!(report.unmatched_tests[0].test_name, "unknown");
        assert_eq!(
            report.unmatched_tests[0].reason,
            UnmatchedReason::MissingTestName
        );
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_structurally_invalid_catalog() {
        let catalog = LabCatalog::from_csv("Test Name,Loinc\nGlucose,2345-7\n").unwrap();
        let report = RecordValidator::new(&catalog).validate(&[observation(json!({
            "TestName": "Glucose",
            "status": "unknown"
        }))]);

        assert_eq!(
            report.unmatched_tests[0].reason,
            UnmatchedReason::CatalogColumnsMissing
        );
        assert!(report.suggestions.is_empty());
        assert_eq!(report.review.status[0].range_display(), "Not found");
        assert!(report.messages[0].starts_with("Required columns missing in catalog"));
    }

    #[test]
    fn test_lookup() {
        let catalog = make_test_catalog();
        let validator = RecordValidator::new(&catalog);

        let found = validator.lookup("blood sugar");
        let matched = found.matched.unwrap();
        assert_eq!(matched.kind, MatchKind::SearchName);
        assert_eq!(matched.test_name.as_deref(), Some("Glucose"));
        assert_eq!(matched.calculated_range.as_deref(), Some("70-100"));
        assert!(found.suggestion.is_none());

        let missing = validator.lookup("Xyzzy123");
        assert!(missing.matched.is_none());
        assert!(matches!(
            missing.suggestion,
            Some(CatalogSuggestion::NewEntry { .. })
        ));
    }

    #[test]
    fn test_custom_config() {
        let catalog = make_test_catalog();
        let config = ValidationConfig {
            similarity_threshold: 95,
            conversion_marker: "CONVERT".into(),
        };
        let validator = RecordValidator::with_config(&catalog, config);
        let report = validator.validate(&[observation(json!({
            "TestName": "Sodum",
            "unit": "CONVERT me"
        }))]);
        assert_eq!(report.review.unit.len(), 1);
        assert!(matches!(
            report.suggestions[0],
            CatalogSuggestion::NewEntry { .. }
        ));
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let catalog = make_test_catalog();
        let observations = vec![observation(json!({"TestName": "Glucose", "status": "unknown"}))];
        let before = observations.clone();
        let _ = RecordValidator::new(&catalog).validate(&observations);
        assert_eq!(observations, before);
    }
}
