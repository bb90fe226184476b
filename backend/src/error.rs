//! Error types for the Tradeboard pipeline.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`FetchError`] - upstream OEC request and response-shape errors
//! - [`TransformError`] - errors raised by the trade data transformer
//! - [`CompanyError`] - company CSV loading errors
//! - [`DashboardError`] - per-view orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors while fetching or decoding an upstream response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connection reset, TLS...).
    #[error("Request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body is not valid JSON.
    #[error("Malformed JSON response: {0}")]
    MalformedJson(String),

    /// Body is JSON but does not match the expected shape.
    #[error("Response failed schema validation: {errors:?}")]
    Schema { errors: Vec<String> },
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors from the trade data transformer.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// Percentages are undefined when the set is empty or sums to zero.
    #[error("Cannot compute shares: {rows} rows with a total trade value of {total}")]
    EmptyInput { rows: usize, total: f64 },

    /// Bucketing threshold must be a finite, non-negative percentage.
    #[error("Invalid bucketing threshold: {0}")]
    InvalidThreshold(f64),
}

// =============================================================================
// Company CSV Errors
// =============================================================================

/// Errors while loading the company dataset.
#[derive(Debug, Error)]
pub enum CompanyError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Empty file.
    #[error("Company file is empty")]
    EmptyFile,

    /// A required column is absent from the header row.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A data row could not be decoded.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },
}

// =============================================================================
// View Errors (top-level)
// =============================================================================

/// Errors raised while building one dashboard view.
///
/// Each view fails on its own: callers render the other views regardless.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Upstream fetch failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Upstream returned zero rows for this view.
    #[error("No data available for {0}")]
    EmptyData(String),

    /// Transformation failed.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// The selected entity has no row in the dataset.
    #[error("Not found: {0}")]
    Lookup(String),

    /// Company dataset failed to load.
    #[error("Company data error: {0}")]
    Company(#[from] CompanyError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// View error.
    #[error("{0}")]
    Dashboard(#[from] DashboardError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Dashboard(DashboardError::Fetch(FetchError::Timeout(_))) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            Self::Dashboard(DashboardError::Fetch(_)) => StatusCode::BAD_GATEWAY,
            Self::Dashboard(DashboardError::EmptyData(_)) => StatusCode::NOT_FOUND,
            Self::Dashboard(DashboardError::Lookup(_)) => StatusCode::NOT_FOUND,
            Self::Dashboard(DashboardError::Transform(TransformError::InvalidThreshold(_))) => {
                StatusCode::BAD_REQUEST
            }
            Self::Dashboard(DashboardError::Transform(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Dashboard(DashboardError::Company(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind, sent alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dashboard(DashboardError::Fetch(_)) => "fetch",
            Self::Dashboard(DashboardError::EmptyData(_)) => "empty_data",
            Self::Dashboard(DashboardError::Transform(TransformError::InvalidThreshold(_))) => {
                "bad_request"
            }
            Self::Dashboard(DashboardError::Transform(_)) => "empty_input",
            Self::Dashboard(DashboardError::Lookup(_)) => "lookup",
            Self::Dashboard(DashboardError::Company(_)) => "company_data",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = crate::api::types::error_response(self.kind(), &self.to_string());
        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for company CSV operations.
pub type CompanyResult<T> = Result<T, CompanyError>;

/// Result type for view operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // FetchError -> DashboardError
        let fetch_err = FetchError::Status { status: 503, body: "busy".into() };
        let view_err: DashboardError = fetch_err.into();
        assert!(view_err.to_string().contains("503"));

        // TransformError -> DashboardError -> ServerError
        let transform_err = TransformError::EmptyInput { rows: 0, total: 0.0 };
        let view_err: DashboardError = transform_err.into();
        let server_err: ServerError = view_err.into();
        assert_eq!(server_err.kind(), "empty_input");
        assert_eq!(server_err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_status_mapping() {
        let lookup: ServerError = DashboardError::Lookup("Cars".into()).into();
        assert_eq!(lookup.status(), StatusCode::NOT_FOUND);

        let timeout: ServerError = DashboardError::Fetch(FetchError::Timeout(30)).into();
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let upstream: ServerError =
            DashboardError::Fetch(FetchError::MalformedJson("eof".into())).into();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_threshold_is_bad_request() {
        let err: ServerError =
            DashboardError::Transform(TransformError::InvalidThreshold(-1.0)).into();
        assert_eq!(err.kind(), "bad_request");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_company_error_format() {
        let err = CompanyError::Parse { line: 5, message: "invalid float literal".into() };
        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("invalid float"));
    }
}
