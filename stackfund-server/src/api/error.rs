//! Error responses for the payment link API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use stackfund_lib::LinkError;
use thiserror::Error;
use tracing::error;

use super::dto::ErrorBody;

/// Errors a handler can return.
///
/// The underlying service error is kept for the log line only; clients get
/// a fixed message per operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required creation field was absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The amount did not parse to a positive number.
    #[error("Invalid amount: must be a positive number")]
    InvalidAmount,

    /// The POST body was not a JSON object.
    #[error("Invalid request body")]
    InvalidBody,

    /// GET without `id` or `creatorAddress`.
    #[error("Missing required parameters")]
    MissingParameters,

    /// No link with the requested id.
    #[error("Payment link not found")]
    NotFound,

    /// Creation failed in storage or id allocation.
    #[error("Failed to create payment link")]
    CreateFailed(LinkError),

    /// A read failed in storage.
    #[error("Failed to fetch payment links")]
    FetchFailed(LinkError),
}

impl ApiError {
    /// Map a service error raised while creating a link.
    pub fn from_create(err: LinkError) -> Self {
        match err {
            LinkError::MissingField(field) => Self::MissingField(field),
            LinkError::InvalidAmount(_) => Self::InvalidAmount,
            LinkError::NotFound(_) => Self::NotFound,
            other => Self::CreateFailed(other),
        }
    }

    /// Map a service error raised while reading links.
    pub fn from_fetch(err: LinkError) -> Self {
        match err {
            LinkError::NotFound(_) => Self::NotFound,
            other => Self::FetchFailed(other),
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// - Validation and missing parameters: 400 Bad Request
    /// - Unknown link: 404 Not Found
    /// - Storage and allocation failures: 500 Internal Server Error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::InvalidAmount
            | Self::InvalidBody
            | Self::MissingParameters => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::CreateFailed(_) | Self::FetchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::CreateFailed(e) => error!(
                code = e.code() as i32,
                retryable = e.is_retryable(),
                reason = %e,
                "Error creating payment link"
            ),
            Self::FetchFailed(e) => error!(
                code = e.code() as i32,
                retryable = e.is_retryable(),
                reason = %e,
                "Error fetching payment links"
            ),
            _ => {}
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
