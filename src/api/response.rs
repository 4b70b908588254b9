//! Uniform JSON response envelope and HTTP error mapping.
//!
//! Every endpoint responds with `{"code": 0, "message": "success", "data": …}`
//! on success and `{"code": -1, "message": …}` on failure, with the HTTP
//! status carrying the error class.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Wrapper carried by every JSON response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// `0` on success, `-1` on failure
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Wraps a payload in the success envelope.
pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        code: 0,
        message: "success".to_string(),
        data: Some(data),
    })
}

/// Success envelope with no payload, for deletes and the like.
#[must_use]
pub fn success_empty() -> Json<Envelope<()>> {
    Json(Envelope {
        code: 0,
        message: "success".to_string(),
        data: None,
    })
}

impl Error {
    /// HTTP status the error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::StudentNotFound { .. }
            | Self::PackageNotFound { .. }
            | Self::CatalogPackageNotFound { .. }
            | Self::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidHours { .. }
            | Self::InvalidDate { .. }
            | Self::EmptyContent
            | Self::InvalidArgument { .. }
            | Self::InsufficientHours { .. }
            | Self::NoActivePackage { .. }
            | Self::PackageOwnershipMismatch { .. }
            | Self::UsernameTaken { .. }
            | Self::Config { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) | Self::Wechat { .. } => StatusCode::BAD_GATEWAY,
            Self::Io(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = Envelope::<()> {
            code: -1,
            message: self.to_string(),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}
