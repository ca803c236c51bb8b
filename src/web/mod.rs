//! JSON API for reviewing lab results over HTTP.
//!
//! Each request carries its own document, catalog and edit set; the server
//! keeps no state between requests.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! lab-reconcile serve
//!
//! # Bind to all interfaces
//! lab-reconcile serve --address 0.0.0.0 --port 3000
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /api/health` - Liveness and version
//! - `POST /api/validate` - Validation report for a document and catalog
//! - `POST /api/edits/apply-date` - Queue one date for every observation
//! - `POST /api/reconcile` - Merge an edit set into a document
//! - `POST /api/lookup` - Resolve one test name against a catalog

pub mod server;
