//! Error types and HTTP error response handling.
//!
//! Every failure a tool call can hit maps to one `AppError` variant with a
//! single human-readable message. The HTTP surface (health, auth) converts
//! errors into status codes; the tool protocol reports the message as an
//! error result.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{ledger::LedgerError, services::resolver::EntityKind};

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation**: Arguments do not match the tool's input contract
/// - **Resolution**: An id-or-name reference matched nothing
/// - **Data access**: The ledger service failed the read or write
/// - **Post-mutation sync**: The write landed but the follow-up sync failed
/// - **Transport**: Unknown tool, bad credentials
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Caller-supplied arguments are invalid. Raised before any ledger call.
    #[error("Invalid arguments: {0}")]
    Validation(String),

    /// An account, category or payee reference did not resolve.
    #[error("{kind} not found: {token}")]
    NotFound { kind: EntityKind, token: String },

    /// The ledger service failed the underlying request.
    ///
    /// No retry is attempted here.
    #[error("Ledger request failed: {0}")]
    Ledger(#[from] LedgerError),

    /// The mutation succeeded but the mandatory sync did not.
    ///
    /// The ledger state has already changed; callers must not blindly retry.
    #[error("{operation} was applied but sync failed: {source}")]
    PostMutationSync {
        operation: String,
        #[source]
        source: LedgerError,
    },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A tool payload could not be rendered as JSON.
    #[error("Failed to encode tool output: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Bearer token is missing or wrong.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl AppError {
    pub fn not_found(kind: EntityKind, token: impl Into<String>) -> Self {
        AppError::NotFound {
            kind,
            token: token.into(),
        }
    }

    /// Stable machine-readable code used in HTTP error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_arguments",
            AppError::NotFound { .. } => "not_found",
            AppError::Ledger(_) => "ledger_error",
            AppError::PostMutationSync { .. } => "sync_failed",
            AppError::UnknownTool(_) => "unknown_tool",
            AppError::Encoding(_) => "internal_error",
            AppError::InvalidApiKey => "invalid_api_key",
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidApiKey` → 401 Unauthorized
/// - `NotFound`, `UnknownTool` → 404 Not Found
/// - `Validation` → 400 Bad Request
/// - `Ledger`, `PostMutationSync` → 502 Bad Gateway
/// - `Encoding` → 500 Internal Server Error
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } | AppError::UnknownTool(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Ledger(_) | AppError::PostMutationSync { .. } => StatusCode::BAD_GATEWAY,
            AppError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}
