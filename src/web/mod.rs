//! HTTP surface for the server actions.
//!
//! `router` exposes any [`CondoActions`](crate::actions::CondoActions)
//! implementation over axum; `client` calls that surface back through the same
//! trait, so views run unchanged against a remote backend.

use crate::core::CondoError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

pub mod client;
pub mod router;

pub use client::HttpCondoActions;
pub use router::build_router;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Condo(CondoError),
    Input(String),
}

impl From<CondoError> for WebError {
    fn from(err: CondoError) -> Self {
        WebError::Condo(err)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        WebError::Input(rejection.body_text())
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        WebError::Input(rejection.body_text())
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        WebError::Input(rejection.body_text())
    }
}

/// `Json` body whose rejections answer with an [`ErrorResponse`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(WebError))]
pub struct ApiJson<T>(pub T);

/// `Path` parameters whose rejections answer with an [`ErrorResponse`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(WebError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(WebError))]
pub struct ApiQuery<T>(pub T);

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Condo(err) => {
                let status = match &err {
                    CondoError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    CondoError::NotFound(_) => StatusCode::NOT_FOUND,
                    CondoError::Forbidden(_) => StatusCode::FORBIDDEN,
                    CondoError::Conflict(_) => StatusCode::CONFLICT,
                    CondoError::Transport(_) => StatusCode::BAD_GATEWAY,
                    CondoError::LockError(_)
                    | CondoError::Config(_)
                    | CondoError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.message().to_string(), err.code().to_string())
            }
            WebError::Input(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                msg,
                "input_error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
        });

        (status, body).into_response()
    }
}

/// Rebuilds a `CondoError` from an error body produced by [`WebError`].
pub fn error_from_response(status: u16, body: ErrorResponse) -> CondoError {
    match body.code.as_str() {
        "validation_error" | "input_error" => CondoError::Validation(body.error),
        "not_found" => CondoError::NotFound(body.error),
        "forbidden" => CondoError::Forbidden(body.error),
        "conflict" => CondoError::Conflict(body.error),
        _ => CondoError::Transport(format!("HTTP {status}: {}", body.error)),
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condo_errors_map_to_http_statuses() {
        let response = WebError::from(CondoError::not_found("apartment")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = WebError::Input("month must be between 1 and 12".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = WebError::from(CondoError::Internal("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_bodies_map_back_to_condo_errors() {
        let err = error_from_response(
            404,
            ErrorResponse {
                error: "gone".into(),
                code: "not_found".into(),
            },
        );
        assert_eq!(err, CondoError::NotFound("gone".into()));

        let err = error_from_response(
            500,
            ErrorResponse {
                error: "boom".into(),
                code: "internal_error".into(),
            },
        );
        assert_eq!(err, CondoError::Transport("HTTP 500: boom".into()));
    }
}
