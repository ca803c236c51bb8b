use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::core::observation::Observation;
use crate::core::types::{Status, TestKey};

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Status '{0}' cannot be assigned; choose one of inRange, warning, outOfRange, optimal")]
    StatusNotAssignable(String),

    #[error("Please enter a date to apply to all tests")]
    EmptyDate,

    #[error("Failed to read edit set: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse edit set: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Pending reviewer corrections, keyed by test name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSet {
    #[serde(default)]
    pub status_updates: BTreeMap<TestKey, Status>,

    #[serde(default)]
    pub unit_updates: BTreeMap<TestKey, String>,

    #[serde(default)]
    pub date_updates: BTreeMap<TestKey, String>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an edit set from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, EditError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse an edit set, rejecting status corrections that cannot be assigned
    pub fn from_json(json: &str) -> Result<Self, EditError> {
        let edits: Self = serde_json::from_str(json)?;
        edits.check_statuses()?;
        Ok(edits)
    }

    /// Fail if any queued status is not one a reviewer may assign
    pub fn check_statuses(&self) -> Result<(), EditError> {
        match self.status_updates.values().find(|s| !s.is_assignable()) {
            Some(status) => Err(EditError::StatusNotAssignable(status.to_string())),
            None => Ok(()),
        }
    }

    /// Queue a status correction
    pub fn set_status(&mut self, test_name: &str, status: Status) -> Result<(), EditError> {
        if !status.is_assignable() {
            return Err(EditError::StatusNotAssignable(status.to_string()));
        }
        tracing::info!("Updated status for {} to {}", test_name, status);
        self.status_updates.insert(TestKey::new(test_name), status);
        Ok(())
    }

    /// Queue a unit correction. Blank input is ignored.
    pub fn set_unit(&mut self, test_name: &str, unit: &str) -> bool {
        let unit = unit.trim();
        if unit.is_empty() {
            return false;
        }
        tracing::info!("Updated unit for {} to {}", test_name, unit);
        self.unit_updates
            .insert(TestKey::new(test_name), unit.to_string());
        true
    }

    /// Queue a date correction. Blank input is ignored.
    pub fn set_date(&mut self, test_name: &str, date: &str) -> bool {
        let date = date.trim();
        if date.is_empty() {
            return false;
        }
        tracing::info!("Updated date for {} to {}", test_name, date);
        self.date_updates
            .insert(TestKey::new(test_name), date.to_string());
        true
    }

    /// Queue the same date for every observation, replacing per-row date edits
    pub fn apply_date_to_all(
        &mut self,
        date: &str,
        observations: &[Observation],
    ) -> Result<usize, EditError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(EditError::EmptyDate);
        }

        let mut applied = 0;
        for key in observations.iter().filter_map(Observation::key) {
            self.date_updates.insert(key, date.to_string());
            applied += 1;
        }

        tracing::info!("Applied date {} to all tests", date);
        Ok(applied)
    }

    /// Drop every queued correction
    pub fn clear(&mut self) {
        self.status_updates.clear();
        self.unit_updates.clear();
        self.date_updates.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status_updates.is_empty() && self.unit_updates.is_empty() && self.date_updates.is_empty()
    }

    /// Total number of queued corrections across all fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.status_updates.len() + self.unit_updates.len() + self.date_updates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_edit_set() {
        let edits = EditSet::from_json(
            r#"{"statusUpdates": {"Glucose": "inRange"}, "dateUpdates": {"Sodium": "2024-05-01"}}"#,
        )
        .unwrap();

        assert_eq!(
            edits.status_updates.get(&TestKey::new("glucose")),
            Some(&Status::InRange)
        );
        assert_eq!(edits.date_updates.len(), 1);
        assert!(edits.unit_updates.is_empty());
    }

    #[test]
    fn test_serialized_keys_keep_reviewer_casing() {
        let mut edits = EditSet::new();
        edits.set_status("Glucose", Status::InRange).unwrap();
        edits.set_date("Vitamin D", "2024-01-01");
        edits.set_date("VITAMIN D", "2024-02-02");

        let json = serde_json::to_value(&edits).unwrap();
        assert_eq!(json["statusUpdates"]["Glucose"], "inRange");
        assert_eq!(json["dateUpdates"].as_object().unwrap().len(), 1);
        assert_eq!(json["dateUpdates"]["Vitamin D"], "2024-02-02");
    }

    #[test]
    fn test_rejects_unassignable_status() {
        let result = EditSet::from_json(r#"{"statusUpdates": {"Glucose": "unknown"}}"#);
        assert!(matches!(result, Err(EditError::StatusNotAssignable(_))));

        let mut edits = EditSet::new();
        assert!(edits.set_status("Glucose", Status::from("bogus")).is_err());
        assert!(edits.is_empty());
    }

    #[test]
    fn test_blank_unit_and_date_ignored() {
        let mut edits = EditSet::new();
        assert!(!edits.set_unit("Glucose", "   "));
        assert!(!edits.set_date("Glucose", ""));
        assert!(edits.set_unit("Glucose", " mmol/L "));
        assert_eq!(
            edits.unit_updates.get(&TestKey::new("Glucose")).map(String::as_str),
            Some("mmol/L")
        );
    }

    #[test]
    fn test_apply_date_to_all_overrides_row_edits() {
        let observations = vec![Observation::new("Glucose"), Observation::new("Sodium")];
        let mut edits = EditSet::new();
        edits.set_date("Glucose", "2023-01-01");

        let applied = edits.apply_date_to_all("2024-06-30", &observations).unwrap();

        assert_eq!(applied, 2);
        assert!(edits
            .date_updates
            .values()
            .all(|date| date == "2024-06-30"));
    }

    #[test]
    fn test_apply_blank_date_is_rejected() {
        let mut edits = EditSet::new();
        let result = edits.apply_date_to_all("  ", &[Observation::new("Glucose")]);
        assert!(matches!(result, Err(EditError::EmptyDate)));
        assert!(edits.is_empty());
    }

    #[test]
    fn test_clear_and_len() {
        let mut edits = EditSet::new();
        edits.set_status("Glucose", Status::Optimal).unwrap();
        edits.set_unit("Glucose", "mg/dL");
        assert_eq!(edits.len(), 2);
        edits.clear();
        assert!(edits.is_empty());
    }
}
