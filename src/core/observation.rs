use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::types::{EditableField, Status, TestKey};

pub const TEST_NAME_FIELD: &str = "TestName";
pub const STATUS_FIELD: &str = "status";
pub const UNIT_FIELD: &str = "unit";
pub const DATE_FIELD: &str = "date";
pub const LOINC_CODE_FIELD: &str = "loincCode";
pub const RESULT_FIELD: &str = "result";

/// Name used when an observation has no usable `TestName`
pub const UNKNOWN_TEST_NAME: &str = "unknown";

/// A single lab test result.
///
/// The typed fields are extracted once when the record is loaded. The original
/// JSON object is retained so that fields the engine never edits (including
/// key order and explicit nulls) are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Observation {
    test_name: Option<String>,
    status: Option<Status>,
    unit: Option<String>,
    date: Option<String>,
    loinc_code: Option<String>,
    result: Option<String>,
    raw: Map<String, Value>,
}

/// Render a scalar JSON value as text; null, arrays and objects have no text form
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl From<Map<String, Value>> for Observation {
    fn from(raw: Map<String, Value>) -> Self {
        let test_name =
            scalar_text(raw.get(TEST_NAME_FIELD)).filter(|name| !name.trim().is_empty());

        Self {
            test_name,
            status: scalar_text(raw.get(STATUS_FIELD)).map(Status::from),
            unit: scalar_text(raw.get(UNIT_FIELD)),
            date: scalar_text(raw.get(DATE_FIELD)),
            loinc_code: scalar_text(raw.get(LOINC_CODE_FIELD)),
            result: scalar_text(raw.get(RESULT_FIELD)),
            raw,
        }
    }
}

impl From<Observation> for Map<String, Value> {
    fn from(observation: Observation) -> Self {
        observation.raw
    }
}

impl Observation {
    /// Create an observation with only a test name
    pub fn new(test_name: impl Into<String>) -> Self {
        let mut raw = Map::new();
        raw.insert(TEST_NAME_FIELD.to_string(), Value::String(test_name.into()));
        Self::from(raw)
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<Status>) -> Self {
        self.set_status(status.into());
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.set_unit(unit);
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.set_date(date);
        self
    }

    #[must_use]
    pub fn with_loinc_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.raw
            .insert(LOINC_CODE_FIELD.to_string(), Value::String(code.clone()));
        self.loinc_code = Some(code);
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: impl Into<Value>) -> Self {
        let result = result.into();
        self.result = scalar_text(Some(&result));
        self.raw.insert(RESULT_FIELD.to_string(), result);
        self
    }

    #[must_use]
    pub fn test_name(&self) -> Option<&str> {
        self.test_name.as_deref()
    }

    /// Test name for reporting, falling back to `unknown`
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.test_name.as_deref().unwrap_or(UNKNOWN_TEST_NAME)
    }

    /// Identity key used by the edit set
    #[must_use]
    pub fn key(&self) -> Option<TestKey> {
        self.test_name.as_deref().map(TestKey::new)
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    #[must_use]
    pub fn loinc_code(&self) -> Option<&str> {
        self.loinc_code.as_deref()
    }

    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Current text of an editable field
    #[must_use]
    pub fn field_text(&self, field: EditableField) -> Option<String> {
        match field {
            EditableField::Status => self.status.as_ref().map(ToString::to_string),
            EditableField::Unit => self.unit.clone(),
            EditableField::Date => self.date.clone(),
        }
    }

    pub fn set_status(&mut self, status: Status) {
        self.raw.insert(
            STATUS_FIELD.to_string(),
            Value::String(status.as_str().to_string()),
        );
        self.status = Some(status);
    }

    pub fn set_unit(&mut self, unit: impl Into<String>) {
        let unit = unit.into();
        self.raw
            .insert(UNIT_FIELD.to_string(), Value::String(unit.clone()));
        self.unit = Some(unit);
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        let date = date.into();
        self.raw
            .insert(DATE_FIELD.to_string(), Value::String(date.clone()));
        self.date = Some(date);
    }

    /// The record as it will be written back out
    #[must_use]
    pub fn as_json(&self) -> &Map<String, Value> {
        &self.raw
    }
}
