use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::observation::Observation;

/// Prefix added to the input file name when saving
pub const UPDATED_PREFIX: &str = "updated_";

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Error saving JSON: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error serializing JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// `updated_<name>` next to the input file
#[must_use]
pub fn updated_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map_or_else(|| "observations.json".into(), |n| n.to_string_lossy());
    input.with_file_name(format!("{UPDATED_PREFIX}{name}"))
}

/// Render observations as a JSON array with four-space indentation.
/// Non-ASCII text is written verbatim.
///
/// # Errors
///
/// Returns `OutputError::Json` if serialization fails.
pub fn to_pretty_json(observations: &[Observation]) -> Result<String, OutputError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    observations.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the observation collection, and nothing else, to `path`
///
/// # Errors
///
/// Returns `OutputError` if the collection cannot be serialized or written.
pub fn write_observations(path: &Path, observations: &[Observation]) -> Result<(), OutputError> {
    let json = to_pretty_json(observations)?;
    std::fs::write(path, json)?;
    info!(
        "Saved {} observations to: {}",
        observations.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_updated_output_path() {
        assert_eq!(
            updated_output_path(Path::new("/data/labs/results.json")),
            PathBuf::from("/data/labs/updated_results.json")
        );
        assert_eq!(
            updated_output_path(Path::new("results.json")),
            PathBuf::from("updated_results.json")
        );
    }

    #[test]
    fn test_four_space_indent_and_key_order() {
        let observations: Vec<Observation> = serde_json::from_value(json!([
            {"TestName": "Glucose", "status": "inRange", "extra": null}
        ]))
        .unwrap();

        let text = to_pretty_json(&observations).unwrap();
        assert_eq!(
            text,
            "[\n    {\n        \"TestName\": \"Glucose\",\n        \"status\": \"inRange\",\n        \"extra\": null\n    }\n]"
        );
    }

    #[test]
    fn test_non_ascii_is_verbatim() {
        let observations = vec![Observation::new("Vitamin B12").with_unit("µg/L")];
        let text = to_pretty_json(&observations).unwrap();
        assert!(text.contains("µg/L"));
    }

    #[test]
    fn test_write_observations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updated_results.json");
        let observations = vec![Observation::new("Glucose").with_status("optimal")];

        write_observations(&path, &observations).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!([{"TestName": "Glucose", "status": "optimal"}]));
    }
}
