//! API error taxonomy and its mapping onto HTTP responses.

use crate::dispatcher::HandlerResponse;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

/// Status used for "record not found" on every id-based endpoint.
///
/// The service historically answered 204 on some paths and 404 on others.
/// One value now applies everywhere; which one is a product decision, so it is
/// configurable and defaults to 404.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum NotFoundStatus {
    /// `404 Not Found` with an `{ "error": "Dog not found" }` body.
    #[default]
    NotFound,
    /// `204 No Content` with an empty body.
    NoContent,
}

impl NotFoundStatus {
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            NotFoundStatus::NotFound => 404,
            NotFoundStatus::NoContent => 204,
        }
    }
}

impl TryFrom<u16> for NotFoundStatus {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            404 => Ok(NotFoundStatus::NotFound),
            204 => Ok(NotFoundStatus::NoContent),
            other => Err(format!("not-found status must be 404 or 204, got {other}")),
        }
    }
}

impl From<NotFoundStatus> for u16 {
    fn from(status: NotFoundStatus) -> Self {
        status.code()
    }
}

/// How errors are rendered to clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorPolicy {
    pub not_found_status: NotFoundStatus,
    /// Include the store's own message in persistence failures.
    pub expose_store_errors: bool,
}

/// Errors a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// The `{id}` path segment is not an integer.
    InvalidId,
    /// The body failed validation. Holds every violation message.
    Validation(Vec<String>),
    /// No record with the requested id.
    NotFound,
    /// The store rejected a write that passed validation.
    Persistence {
        operation: &'static str,
        source: StoreError,
    },
    /// Anything the client could not have caused.
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn persistence(operation: &'static str, source: StoreError) -> Self {
        ApiError::Persistence { operation, source }
    }

    /// Render the error as a handler response under `policy`.
    #[must_use]
    pub fn into_response(self, policy: &ErrorPolicy) -> HandlerResponse {
        match self {
            ApiError::InvalidId => {
                HandlerResponse::json(400, json!({ "message": "id should be a number" }))
            }
            ApiError::Validation(errors) => HandlerResponse::json(400, json!({ "errors": errors })),
            ApiError::NotFound => match policy.not_found_status {
                NotFoundStatus::NotFound => {
                    HandlerResponse::json(404, json!({ "error": "Dog not found" }))
                }
                NotFoundStatus::NoContent => HandlerResponse::empty(204),
            },
            ApiError::Persistence { operation, source } => {
                warn!(operation, error = %source, "Store rejected write");
                let mut body = json!({ "error": format!("could not {operation}") });
                if policy.expose_store_errors {
                    body["detail"] = json!(source.to_string());
                }
                HandlerResponse::json(400, body)
            }
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Internal error while handling request");
                HandlerResponse::error(500, "Internal Server Error")
            }
        }
    }
}

/// Store failures outside a write are not the client's doing.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidId => write!(f, "id should be a number"),
            ApiError::Validation(errors) => write!(f, "validation failed: {}", errors.join("; ")),
            ApiError::NotFound => write!(f, "dog not found"),
            ApiError::Persistence { operation, source } => {
                write!(f, "could not {operation}: {source}")
            }
            ApiError::Internal(detail) => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}
