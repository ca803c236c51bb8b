use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Case-insensitive identity of an observation, derived from its test name.
///
/// Equality, ordering and hashing use the lowercased name. The name as
/// supplied is kept for display and serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TestKey {
    name: String,
    normalized: String,
}

impl TestKey {
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        Self {
            normalized: name.to_lowercase(),
            name: name.to_string(),
        }
    }

    /// Lowercased form used for comparison
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The name as it was supplied
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for TestKey {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for TestKey {}

impl Hash for TestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl PartialOrd for TestKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TestKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl From<String> for TestKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TestKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<TestKey> for String {
    fn from(key: TestKey) -> Self {
        key.name
    }
}

impl std::fmt::Display for TestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Result status reported for an observation.
///
/// Values outside the known set are kept verbatim in `Other` so they survive
/// a load/save cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    InRange,
    Warning,
    OutOfRange,
    Optimal,
    Unknown,
    Other(String),
}

impl Status {
    /// Statuses a reviewer may assign as a correction
    pub const ASSIGNABLE: [Status; 4] = [
        Status::InRange,
        Status::Warning,
        Status::OutOfRange,
        Status::Optimal,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InRange => "inRange",
            Self::Warning => "warning",
            Self::OutOfRange => "outOfRange",
            Self::Optimal => "optimal",
            Self::Unknown => "unknown",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Self::InRange | Self::Warning | Self::OutOfRange | Self::Optimal
        )
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.as_str() {
            "inRange" => Self::InRange,
            "warning" => Self::Warning,
            "outOfRange" => Self::OutOfRange,
            "optimal" => Self::Optimal,
            "unknown" => Self::Unknown,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The observation fields a reviewer can correct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    Status,
    Unit,
    Date,
}

impl EditableField {
    /// JSON field name in the observation document
    #[must_use]
    pub fn json_key(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Unit => "unit",
            Self::Date => "date",
        }
    }
}

impl std::fmt::Display for EditableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.json_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_case_insensitive() {
        assert_eq!(TestKey::new("Glucose"), TestKey::new("GLUCOSE "));
        assert_eq!(TestKey::new("Glucose").as_str(), "glucose");
    }

    #[test]
    fn test_key_keeps_supplied_name() {
        let key = TestKey::new(" Hemoglobin A1c ");
        assert_eq!(key.name(), "Hemoglobin A1c");
        assert_eq!(key.to_string(), "Hemoglobin A1c");
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            "\"Hemoglobin A1c\""
        );
    }

    #[test]
    fn test_status_round_trips_unknown_values() {
        let status = Status::from("pending");
        assert_eq!(status, Status::Other("pending".to_string()));
        assert_eq!(String::from(status), "pending");
        assert_eq!(Status::from("outOfRange"), Status::OutOfRange);
    }

    #[test]
    fn test_assignable_statuses() {
        assert!(Status::InRange.is_assignable());
        assert!(!Status::Unknown.is_assignable());
        assert!(!Status::Other("x".into()).is_assignable());
        assert!(Status::ASSIGNABLE.iter().all(Status::is_assignable));
    }

    #[test]
    fn test_status_deserializes_from_json_string() {
        let status: Status = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(status, Status::Warning);
    }
}
