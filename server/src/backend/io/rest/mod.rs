//! # REST Interface Layer
//!
//! HTTP endpoints of the settlement tracker:
//!
//! - **page_apis**: the server-rendered page (`GET /`, `POST /`,
//!   `POST /crear_socio`) with flash messages and redirects
//! - **report_apis**: JSON endpoints under `/api` and the CSV export
//!
//! Handlers only translate between HTTP and the domain services. Domain
//! errors are mapped to status codes here.

pub mod flash;
pub mod forms;
pub mod html;
pub mod mappers;
pub mod page_apis;
pub mod report_apis;

pub use page_apis::*;
pub use report_apis::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;

use crate::backend::domain::errors::DomainError;

/// Status code for a domain error
pub fn error_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Store(_) => StatusCode::BAD_GATEWAY,
        DomainError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error body with the matching status code
pub fn error_response(error: DomainError) -> Response {
    (
        error_status(&error),
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
