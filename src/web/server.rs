use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::catalog::store::LabCatalog;
use crate::cli::ServeArgs;
use crate::core::edits::EditSet;
use crate::parsing::observations::{LoadOptions, ObservationDocument};
use crate::reconcile::merge::{reconcile, ReconcileOutcome};
use crate::reconcile::session::ReviewSession;
use crate::validation::engine::{RecordValidator, ValidationConfig, ValidationReport};

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_BODY_SIZE: usize = 20 * 1024 * 1024; // 20MB
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Enhanced error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

fn bad_request(error_type: &str, message: &str, details: Option<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            error_type: error_type.to_string(),
            details,
        }),
    )
        .into_response()
}

fn invalid_body(rejection: &JsonRejection) -> Response {
    bad_request(
        "invalid_request",
        "Request body must be valid JSON with the expected fields",
        Some(rejection.body_text()),
    )
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Lab results document (object holding the collection, or a bare array)
    pub document: Value,
    pub catalog_csv: String,
    pub collection_key: Option<String>,
    pub similarity_threshold: Option<u8>,
    pub conversion_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyDateRequest {
    pub document: Value,
    #[serde(default)]
    pub edits: EditSet,
    pub date: String,
    pub collection_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub document: Value,
    pub edits: EditSet,
    pub collection_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub catalog_csv: String,
    pub name: String,
    pub similarity_threshold: Option<u8>,
}

fn load_options(collection_key: Option<String>) -> LoadOptions {
    collection_key.map_or_else(LoadOptions::default, |collection_key| LoadOptions {
        collection_key,
    })
}

fn validation_config(
    similarity_threshold: Option<u8>,
    conversion_marker: Option<String>,
) -> Result<ValidationConfig, Response> {
    let mut config = ValidationConfig::default();
    if let Some(threshold) = similarity_threshold {
        if threshold > 100 {
            return Err(bad_request(
                "invalid_threshold",
                "similarity_threshold must be between 0 and 100",
                None,
            ));
        }
        config.similarity_threshold = threshold;
    }
    if let Some(marker) = conversion_marker.filter(|m| !m.is_empty()) {
        config.conversion_marker = marker;
    }
    Ok(config)
}

fn load_document(
    document: Value,
    collection_key: Option<String>,
) -> Result<ObservationDocument, Response> {
    ObservationDocument::from_value(document, &load_options(collection_key)).map_err(|e| {
        bad_request(
            "invalid_document",
            "Invalid observation document",
            Some(e.to_string()),
        )
    })
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// API routes with security headers, timeout, concurrency and body limits.
///
/// Every request carries its own inputs, so there is no shared state.
pub fn api_router() -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/validate", post(validate_handler))
        .route("/api/edits/apply-date", post(apply_date_handler))
        .route("/api/reconcile", post(reconcile_handler))
        .route("/api/lookup", post(lookup_handler))
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("cache-control"),
                    HeaderValue::from_static("no-store"),
                ))
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

/// Create the application router: API routes plus per-IP rate limiting.
///
/// Rate limiting keys on the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router() -> anyhow::Result<Router> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    Ok(api_router().layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let app = create_router()?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting lab-reconcile API at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Validate a document against a catalog. Input problems are reported in
/// the report's `messages`, not as HTTP errors.
async fn validate_handler(payload: Result<Json<ValidateRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(&rejection),
    };

    let config = match validation_config(request.similarity_threshold, request.conversion_marker) {
        Ok(config) => config,
        Err(response) => return response,
    };

    let mut messages = Vec::new();

    let document =
        match ObservationDocument::from_value(request.document, &load_options(request.collection_key)) {
            Ok(document) => Some(document),
            Err(e) => {
                messages.push(format!("Error loading JSON: {e}"));
                None
            }
        };

    let catalog = match LabCatalog::from_csv(&request.catalog_csv) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            messages.push(format!("Error loading CSV: {e}"));
            None
        }
    };

    let report = match (document, catalog) {
        (Some(document), Some(catalog)) => {
            ReviewSession::from_parts(document, catalog, config).validate()
        }
        _ => ValidationReport::with_messages(messages),
    };

    Json(report).into_response()
}

/// Queue one date for every observation in the document
async fn apply_date_handler(payload: Result<Json<ApplyDateRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(&rejection),
    };

    let document = match load_document(request.document, request.collection_key) {
        Ok(document) => document,
        Err(response) => return response,
    };

    let mut edits = request.edits;
    if let Err(e) = edits.check_statuses() {
        return bad_request("invalid_edits", &e.to_string(), None);
    }

    match edits.apply_date_to_all(&request.date, &document.observations) {
        Ok(applied) => Json(serde_json::json!({
            "applied": applied,
            "edits": edits,
        }))
        .into_response(),
        Err(e) => bad_request("empty_date", &e.to_string(), None),
    }
}

/// Merge an edit set into the document's observations
async fn reconcile_handler(payload: Result<Json<ReconcileRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(&rejection),
    };

    let document = match load_document(request.document, request.collection_key) {
        Ok(document) => document,
        Err(response) => return response,
    };

    if let Err(e) = request.edits.check_statuses() {
        return bad_request("invalid_edits", &e.to_string(), None);
    }

    match reconcile(document.observations, &request.edits) {
        ReconcileOutcome::Applied(reconciled) => Json(serde_json::json!({
            "applied": true,
            "updated_count": reconciled.updated_count,
            "changes": reconciled.changes,
            "observations": reconciled.observations,
        }))
        .into_response(),
        outcome => Json(serde_json::json!({
            "applied": false,
            "message": outcome.message(),
        }))
        .into_response(),
    }
}

/// Resolve a single name against a catalog
async fn lookup_handler(payload: Result<Json<LookupRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(&rejection),
    };

    let config = match validation_config(request.similarity_threshold, None) {
        Ok(config) => config,
        Err(response) => return response,
    };

    let catalog = match LabCatalog::from_csv(&request.catalog_csv) {
        Ok(catalog) => catalog,
        Err(e) => {
            return bad_request("invalid_catalog", "Invalid catalog CSV", Some(e.to_string()))
        }
    };

    let lookup = RecordValidator::with_config(&catalog, config).lookup(&request.name);
    Json(serde_json::json!({
        "structurally_valid": catalog.is_structurally_valid(),
        "missing_columns": &catalog.missing_columns,
        "lookup": lookup,
    }))
    .into_response()
}
