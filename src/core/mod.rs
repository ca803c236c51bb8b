//! Core data types for lab result reconciliation.
//!
//! - [`Observation`]: one lab test result, typed on load
//! - [`EditSet`]: pending reviewer corrections keyed by test name
//! - [`TestKey`], [`Status`], [`EditableField`]: identity and field types
//!
//! ## Identity
//!
//! Observations are identified by their `TestName`, compared case-insensitively.
//! Names are assumed unique within one document, but nothing enforces it:
//! duplicate rows are validated independently and an edit keyed on a name
//! applies to every row carrying it.
//!
//! [`Observation`]: observation::Observation
//! [`EditSet`]: edits::EditSet
//! [`TestKey`]: types::TestKey
//! [`Status`]: types::Status
//! [`EditableField`]: types::EditableField

pub mod edits;
pub mod observation;
pub mod types;
