use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::observation::Observation;
use crate::utils::validation::{check_row_limit, MAX_OBSERVATIONS};

/// Key holding the observation collection in lab export documents
pub const DEFAULT_COLLECTION_KEY: &str = "enhancedSerScanObject";

#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("Failed to read observations: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid observation document: {0}")]
    InvalidDocument(String),

    #[error("Too many observations: {0} exceeds maximum allowed ({MAX_OBSERVATIONS})")]
    TooManyObservations(usize),
}

/// Options controlling how an observation document is read
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Key of the observation array when the document root is an object
    pub collection_key: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            collection_key: DEFAULT_COLLECTION_KEY.to_string(),
        }
    }
}

/// Observations loaded from one JSON document
#[derive(Debug, Clone, Default)]
pub struct ObservationDocument {
    /// File the document was read from, if any
    pub source: Option<PathBuf>,

    /// The observation collection, in document order
    pub observations: Vec<Observation>,

    /// Non-fatal problems found while loading (skipped rows, missing collection)
    pub messages: Vec<String>,
}

impl ObservationDocument {
    /// Load a document from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ObservationError::Io` if the file cannot be read, or other
    /// errors if the content is not a valid observation document.
    pub fn load_from_file(path: &Path, options: &LoadOptions) -> Result<Self, ObservationError> {
        let content = std::fs::read_to_string(path)?;
        let mut document = Self::from_json(&content, options)?;
        document.source = Some(path.to_path_buf());
        info!(
            "Loaded {} observations from {}",
            document.observations.len(),
            path.display()
        );
        Ok(document)
    }

    /// Parse a document from JSON text
    ///
    /// # Errors
    ///
    /// Returns `ObservationError::Json` for malformed JSON, or other errors if
    /// the content is not a valid observation document.
    pub fn from_json(json: &str, options: &LoadOptions) -> Result<Self, ObservationError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value, options)
    }

    /// Extract the observation collection from a parsed document.
    ///
    /// An object root holds the collection under `options.collection_key`; a
    /// missing key is an empty collection. An array root is the collection
    /// itself. Elements that are not objects are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ObservationError::InvalidDocument` if the root or the
    /// collection has the wrong shape, or `TooManyObservations` past the limit.
    pub fn from_value(value: Value, options: &LoadOptions) -> Result<Self, ObservationError> {
        let mut messages = Vec::new();

        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut root) => match root.remove(&options.collection_key) {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(ObservationError::InvalidDocument(format!(
                        "'{}' must be an array, found {}",
                        options.collection_key,
                        json_type_name(&other)
                    )))
                }
                None => {
                    let message = format!(
                        "Document has no '{}' collection",
                        options.collection_key
                    );
                    warn!("{}", message);
                    messages.push(message);
                    Vec::new()
                }
            },
            other => {
                return Err(ObservationError::InvalidDocument(format!(
                    "root must be an object or array, found {}",
                    json_type_name(&other)
                )))
            }
        };

        let mut observations = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            if check_row_limit(observations.len(), MAX_OBSERVATIONS).is_some() {
                return Err(ObservationError::TooManyObservations(i + 1));
            }
            match item {
                Value::Object(record) => observations.push(Observation::from(record)),
                other => {
                    let message = format!(
                        "Skipped observation {}: expected an object, found {}",
                        i + 1,
                        json_type_name(&other)
                    );
                    warn!("{}", message);
                    messages.push(message);
                }
            }
        }

        Ok(Self {
            source: None,
            observations,
            messages,
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
