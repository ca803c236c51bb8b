//! Merging reviewer corrections back into observations.
//!
//! [`reconcile`] overwrites exactly the fields named in an [`EditSet`] and
//! counts every write. [`ReviewSession`] ties loading, validation, editing
//! and saving together for one reviewer pass.
//!
//! [`EditSet`]: crate::core::edits::EditSet

pub mod merge;
pub mod output;
pub mod session;

pub use merge::{reconcile, FieldChange, ReconcileOutcome, Reconciled};
pub use session::{ReviewSession, SaveResult, SessionError};
