//! API error type and its HTTP mapping.
//!
//! Every handler returns `Result<_, ApiError>`; the [`IntoResponse`] impl
//! turns the error into a `{"detail": ...}` JSON body with the right status
//! code. Storage failures are reported to Sentry before the caller sees a
//! generic 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::RepositoryError;
use crate::db::orders::CheckoutError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad input; the message is safe to show to the caller.
    #[error("{0}")]
    Validation(String),
    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,
    /// A required request field was absent.
    #[error("{0} required")]
    MissingField(&'static str),
    #[error("{0}")]
    Unauthorized(String),
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    /// Storage or other infrastructure failure. The source is logged; the
    /// caller only sees a generic message.
    #[error("internal server error")]
    Internal(#[source] RepositoryError),
}

impl ApiError {
    /// The stock 404 with the canonical detail message.
    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound("Not found.".to_owned())
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::EmptyCart | Self::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::not_found(),
            RepositoryError::Conflict(message) => Self::Validation(message),
            other => Self::Internal(other),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart => Self::EmptyCart,
            CheckoutError::Repository(source) => source.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Internal(source) = &self {
            tracing::error!(error = %source, "request failed");
            sentry::capture_error(source);
        }
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
