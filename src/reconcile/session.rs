use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::store::LabCatalog;
use crate::core::edits::{EditError, EditSet};
use crate::parsing::observations::{LoadOptions, ObservationDocument};
use crate::reconcile::merge::{reconcile, ReconcileOutcome};
use crate::reconcile::output::{updated_output_path, write_observations, OutputError};
use crate::validation::engine::{RecordValidator, ValidationConfig, ValidationReport};

pub const NO_OBSERVATIONS: &str = "Failed to load data: no observations found in JSON";
pub const EMPTY_CATALOG: &str = "Failed to load data: catalog CSV has no test rows";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No JSON data loaded to save.")]
    NoDocument,

    #[error("No output path given and the observations were not loaded from a file")]
    NoOutputPath,

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Result of saving a session
#[derive(Debug)]
pub struct SaveResult {
    pub outcome: ReconcileOutcome,

    /// Where the collection was written; `None` for no-op outcomes
    pub path: Option<PathBuf>,
}

/// One reviewer's pass over a document: validate, queue corrections, save.
///
/// Load failures do not abort the session. They are kept as messages and
/// surface in the next validation report. A later successful load of the
/// same input replaces its message.
#[derive(Debug, Default)]
pub struct ReviewSession {
    document: Option<ObservationDocument>,
    catalog: Option<LabCatalog>,
    config: ValidationConfig,
    edits: EditSet,
    document_error: Option<String>,
    catalog_error: Option<String>,
}

impl ReviewSession {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start a session from already-loaded inputs
    pub fn from_parts(
        document: ObservationDocument,
        catalog: LabCatalog,
        config: ValidationConfig,
    ) -> Self {
        Self {
            document: Some(document),
            catalog: Some(catalog),
            ..Self::new(config)
        }
    }

    /// Load both inputs from disk, recording any failure as a message
    pub fn load(
        observations: &Path,
        catalog: &Path,
        options: &LoadOptions,
        config: ValidationConfig,
    ) -> Self {
        let mut session = Self::new(config);
        session.load_observations(observations, options);
        session.load_catalog(catalog);
        session
    }

    pub fn load_observations(&mut self, path: &Path, options: &LoadOptions) {
        match ObservationDocument::load_from_file(path, options) {
            Ok(document) => {
                self.document = Some(document);
                self.document_error = None;
            }
            Err(e) => {
                let message = format!("Error loading JSON {}: {}", path.display(), e);
                warn!("{}", message);
                self.document = None;
                self.document_error = Some(message);
            }
        }
    }

    pub fn load_catalog(&mut self, path: &Path) {
        match LabCatalog::load_from_file(path) {
            Ok(catalog) => {
                self.catalog = Some(catalog);
                self.catalog_error = None;
            }
            Err(e) => {
                let message = format!("Error loading CSV {}: {}", path.display(), e);
                warn!("{}", message);
                self.catalog = None;
                self.catalog_error = Some(message);
            }
        }
    }

    #[must_use]
    pub fn document(&self) -> Option<&ObservationDocument> {
        self.document.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&LabCatalog> {
        self.catalog.as_ref()
    }

    #[must_use]
    pub fn edits(&self) -> &EditSet {
        &self.edits
    }

    /// Queue corrections between validation and save
    pub fn edits_mut(&mut self) -> &mut EditSet {
        &mut self.edits
    }

    /// Validate the loaded observations. Queued corrections are discarded.
    ///
    /// Returns a report holding only messages if either input failed to load
    /// or holds no rows.
    pub fn validate(&mut self) -> ValidationReport {
        self.edits.clear();

        let mut messages: Vec<String> = self
            .document_error
            .iter()
            .chain(&self.catalog_error)
            .cloned()
            .collect();
        let (Some(document), Some(catalog)) = (&self.document, &self.catalog) else {
            if messages.is_empty() {
                messages.push("Please select both JSON and CSV files.".to_string());
            }
            return ValidationReport::with_messages(messages);
        };

        messages.extend(document.messages.iter().cloned());
        if document.observations.is_empty() {
            messages.push(NO_OBSERVATIONS.to_string());
        }
        if catalog.is_empty() {
            messages.push(EMPTY_CATALOG.to_string());
        }
        if document.observations.is_empty() || catalog.is_empty() {
            warn!("Failed to load data: nothing to validate");
            return ValidationReport::with_messages(messages);
        }

        let mut report =
            RecordValidator::with_config(catalog, self.config.clone()).validate(&document.observations);
        messages.append(&mut report.messages);
        report.messages = messages;
        report
    }

    /// Queue `date` for every loaded observation
    ///
    /// # Errors
    ///
    /// Returns `EditError::EmptyDate` if `date` is blank.
    pub fn apply_date_to_all(&mut self, date: &str) -> Result<usize, EditError> {
        let observations = self
            .document
            .as_ref()
            .map_or(&[][..], |d| d.observations.as_slice());
        self.edits.apply_date_to_all(date, observations)
    }

    /// Merge queued corrections and write the collection.
    ///
    /// Without `output`, the file is written as `updated_<name>` next to the
    /// input. No-op outcomes write nothing. The loaded document keeps the
    /// merged values.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if nothing is loaded, no output location is
    /// known, or the file cannot be written.
    pub fn save(&mut self, output: Option<&Path>) -> Result<SaveResult, SessionError> {
        let document = self.document.as_mut().ok_or(SessionError::NoDocument)?;

        let reconciled = match reconcile(document.observations.clone(), &self.edits) {
            ReconcileOutcome::Applied(reconciled) => reconciled,
            outcome => {
                return Ok(SaveResult {
                    outcome,
                    path: None,
                })
            }
        };

        let path = match (output, &document.source) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(source)) => updated_output_path(source),
            (None, None) => return Err(SessionError::NoOutputPath),
        };

        write_observations(&path, &reconciled.observations)?;
        document.observations.clone_from(&reconciled.observations);
        info!(
            "Applied {} updates, saved to: {}",
            reconciled.updated_count,
            path.display()
        );

        Ok(SaveResult {
            outcome: ReconcileOutcome::Applied(reconciled),
            path: Some(path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Status;
    use std::fs;

    const CATALOG: &str = "Test Name,Search Names,Calculated range,Unit,Loinc\n\
                           Glucose,\"Gluc, Blood Sugar\",70-100,mg/dL,2345-7\n\
                           Sodium,Na,135-145,mmol/L,2951-2\n";

    const OBSERVATIONS: &str = r#"{
        "patient": "p-1",
        "enhancedSerScanObject": [
            {"TestName": "Glucose", "status": "unknown", "loincCode": "2345-7", "date": "2024-01-05"},
            {"TestName": "Sodium", "status": "inRange", "loincCode": "2951-2", "date": "2024-01-05"}
        ]
    }"#;

    fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let observations = dir.join("results.json");
        let catalog = dir.join("catalog.csv");
        fs::write(&observations, OBSERVATIONS).unwrap();
        fs::write(&catalog, CATALOG).unwrap();
        (observations, catalog)
    }

    #[test]
    fn test_validate_then_save() {
        let dir = tempfile::tempdir().unwrap();
        let (observations, catalog) = write_inputs(dir.path());
        let mut session = ReviewSession::load(
            &observations,
            &catalog,
            &LoadOptions::default(),
            ValidationConfig::default(),
        );

        let report = session.validate();
        assert_eq!(report.total_observations, 2);
        assert_eq!(report.review.status.len(), 1);

        session
            .edits_mut()
            .set_status("Glucose", Status::InRange)
            .unwrap();
        let result = session.save(None).unwrap();

        assert_eq!(result.outcome.updated_count(), 1);
        let path = result.path.unwrap();
        assert_eq!(path, dir.path().join("updated_results.json"));

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(saved.is_array());
        assert_eq!(saved[0]["status"], "inRange");
        assert_eq!(saved[1]["status"], "inRange");
    }

    #[test]
    fn test_validate_clears_edits() {
        let dir = tempfile::tempdir().unwrap();
        let (observations, catalog) = write_inputs(dir.path());
        let mut session = ReviewSession::load(
            &observations,
            &catalog,
            &LoadOptions::default(),
            ValidationConfig::default(),
        );

        session.edits_mut().set_unit("Glucose", "mmol/L");
        let _ = session.validate();
        assert!(session.edits().is_empty());

        let result = session.save(None).unwrap();
        assert!(matches!(result.outcome, ReconcileOutcome::NothingToApply));
        assert!(result.path.is_none());
    }

    #[test]
    fn test_load_errors_become_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ReviewSession::load(
            &dir.path().join("missing.json"),
            &dir.path().join("missing.csv"),
            &LoadOptions::default(),
            ValidationConfig::default(),
        );

        let report = session.validate();
        assert_eq!(report.total_observations, 0);
        assert_eq!(report.messages.len(), 2);
        assert!(report.messages[0].starts_with("Error loading JSON"));
        assert!(matches!(session.save(None), Err(SessionError::NoDocument)));
    }

    #[test]
    fn test_header_only_catalog_is_not_validated() {
        let dir = tempfile::tempdir().unwrap();
        let (observations, catalog) = write_inputs(dir.path());
        fs::write(&catalog, "Test Name,Search Names,Calculated range,Unit,Loinc\n").unwrap();

        let mut session = ReviewSession::load(
            &observations,
            &catalog,
            &LoadOptions::default(),
            ValidationConfig::default(),
        );
        let report = session.validate();

        assert_eq!(report.messages, vec![EMPTY_CATALOG.to_string()]);
        assert_eq!(report.total_observations, 0);
        assert!(report.unmatched_tests.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_empty_collection_is_not_validated() {
        let dir = tempfile::tempdir().unwrap();
        let (observations, catalog) = write_inputs(dir.path());
        fs::write(&observations, r#"{"enhancedSerScanObject": []}"#).unwrap();

        let mut session = ReviewSession::load(
            &observations,
            &catalog,
            &LoadOptions::default(),
            ValidationConfig::default(),
        );
        let report = session.validate();

        assert_eq!(report.messages, vec![NO_OBSERVATIONS.to_string()]);
        assert!(report.review.date.is_empty());
    }

    #[test]
    fn test_reload_replaces_earlier_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let (observations, catalog) = write_inputs(dir.path());
        let mut session = ReviewSession::load(
            &dir.path().join("missing.json"),
            &catalog,
            &LoadOptions::default(),
            ValidationConfig::default(),
        );
        assert_eq!(session.validate().messages.len(), 1);

        session.load_observations(&observations, &LoadOptions::default());
        let report = session.validate();

        assert!(report.messages.is_empty());
        assert_eq!(report.total_observations, 2);
    }

    #[test]
    fn test_apply_date_to_all_overrides_row_edits() {
        let dir = tempfile::tempdir().unwrap();
        let (observations, catalog) = write_inputs(dir.path());
        let mut session = ReviewSession::load(
            &observations,
            &catalog,
            &LoadOptions::default(),
            ValidationConfig::default(),
        );
        let _ = session.validate();

        session.edits_mut().set_date("Glucose", "2023-12-31");
        assert_eq!(session.apply_date_to_all("2024-06-01").unwrap(), 2);
        assert!(matches!(
            session.apply_date_to_all("  "),
            Err(EditError::EmptyDate)
        ));

        let output = dir.path().join("out.json");
        let result = session.save(Some(&output)).unwrap();
        assert_eq!(result.outcome.updated_count(), 2);

        let document = session.document().unwrap();
        assert!(document
            .observations
            .iter()
            .all(|o| o.date() == Some("2024-06-01")));
    }
}
