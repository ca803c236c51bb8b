//! Shared helpers: input limits and text normalization.

pub mod validation;
