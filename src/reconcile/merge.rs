use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::core::edits::EditSet;
use crate::core::observation::Observation;
use crate::core::types::EditableField;

/// One field overwritten during reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub test_name: String,
    pub field: EditableField,
    pub previous: Option<String>,
    pub current: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Updated {} {} to {}",
            self.test_name, self.field, self.current
        )
    }
}

/// Observations after edits were merged in
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub observations: Vec<Observation>,

    /// Field-level writes, including writes of an identical value
    pub updated_count: usize,

    pub changes: Vec<FieldChange>,
}

/// Result of merging an edit set into observations
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    Applied(Reconciled),
    /// The edit set was empty
    NothingToApply,
    /// No edit named any observation
    NoMatchingTests,
}

impl ReconcileOutcome {
    /// Informational message for the no-op outcomes
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Applied(_) => None,
            Self::NothingToApply => Some("No status, unit, or date updates to save."),
            Self::NoMatchingTests => Some("No matching TestNames found to update."),
        }
    }

    #[must_use]
    pub fn updated_count(&self) -> usize {
        match self {
            Self::Applied(reconciled) => reconciled.updated_count,
            Self::NothingToApply | Self::NoMatchingTests => 0,
        }
    }
}

/// Merge queued corrections into the observations.
///
/// For each observation whose test name is queued in a field's map, exactly
/// that field is overwritten; all other fields pass through untouched.
/// Applying the same edit set twice gives the same result.
#[must_use]
pub fn reconcile(mut observations: Vec<Observation>, edits: &EditSet) -> ReconcileOutcome {
    if edits.is_empty() {
        info!("No status, unit, or date updates to save.");
        return ReconcileOutcome::NothingToApply;
    }

    let mut changes = Vec::new();

    for observation in &mut observations {
        let Some(key) = observation.key() else {
            continue;
        };
        let test_name = observation.display_name().to_string();

        if let Some(status) = edits.status_updates.get(&key) {
            let previous = observation.field_text(EditableField::Status);
            observation.set_status(status.clone());
            changes.push(FieldChange {
                test_name: test_name.clone(),
                field: EditableField::Status,
                previous,
                current: status.to_string(),
            });
        }

        if let Some(unit) = edits.unit_updates.get(&key) {
            let previous = observation.field_text(EditableField::Unit);
            observation.set_unit(unit.clone());
            changes.push(FieldChange {
                test_name: test_name.clone(),
                field: EditableField::Unit,
                previous,
                current: unit.clone(),
            });
        }

        if let Some(date) = edits.date_updates.get(&key) {
            let previous = observation.field_text(EditableField::Date);
            observation.set_date(date.clone());
            changes.push(FieldChange {
                test_name,
                field: EditableField::Date,
                previous,
                current: date.clone(),
            });
        }
    }

    if changes.is_empty() {
        warn!("No matching TestNames found to update.");
        return ReconcileOutcome::NoMatchingTests;
    }

    for change in &changes {
        info!("{}", change);
    }

    ReconcileOutcome::Applied(Reconciled {
        updated_count: changes.len(),
        observations,
        changes,
    })
}
