//! Maps `AppError` onto HTTP responses carrying the user-facing notice.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use ps_core::error::{AppError, FetchError};
use ps_core::notice::Notice;
use serde::Serialize;
use std::fmt;

/// Newtype so actix's `ResponseError` can be implemented for `AppError`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    notice: Option<&'a Notice>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Fetch(FetchError::NoConnectivity) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Fetch(FetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("request failed: {}", self.0);
        }
        let notice = Notice::for_error(&self.0);
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.0.to_string(),
            notice: notice.as_ref(),
        })
    }
}
