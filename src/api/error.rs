use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

use crate::{app::ReportError, clients::FeedError};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps report failures and malformed queries onto HTTP statuses with a
/// `{"error": ...}` body.
#[derive(Debug)]
pub(crate) enum ApiError {
    Report(ReportError),
    Query(QueryRejection),
}

impl From<ReportError> for ApiError {
    fn from(error: ReportError) -> Self {
        Self::Report(error)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Query(rejection)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Report(ReportError::UnknownSource(_)) => StatusCode::NOT_FOUND,
            Self::Report(ReportError::InvalidLimit(_)) | Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Report(ReportError::Feed(FeedError::RateLimited { .. })) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::Report(ReportError::Feed(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    fn retry_after(&self) -> Option<HeaderValue> {
        match self {
            Self::Report(ReportError::Feed(FeedError::RateLimited {
                retry_after_secs: Some(secs),
            })) => HeaderValue::from_str(&secs.to_string()).ok(),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Report(error) => error.to_string(),
            Self::Query(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            warn!(error = %message, "report request failed");
        }

        let retry_after = self.retry_after();
        let mut response = (status, Json(ErrorBody { error: message })).into_response();
        if let Some(value) = retry_after {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}
