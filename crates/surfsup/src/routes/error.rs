use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    climate::Error,
    dates::{self, format_date},
};

/// JSON body returned for every failed request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ErrorResponse {
    /// Raw path segment that could not be parsed as a date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub error: String,
}

impl ErrorResponse {
    fn message(error: impl ToString) -> Self {
        Self {
            input: None,
            start_date: None,
            end_date: None,
            error: error.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::InvalidDate(dates::Error::InvalidDateFormat { input }) => {
                info!("rejected date input: {}", input);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        input: Some(input.clone()),
                        ..ErrorResponse::message(&self)
                    },
                )
            }
            Error::InvalidDate(_) => (StatusCode::BAD_REQUEST, ErrorResponse::message(&self)),
            Error::InvalidRange { start, end } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    start_date: Some(format_date(*start)),
                    end_date: Some(format_date(*end)),
                    ..ErrorResponse::message(&self)
                },
            ),
            Error::NoData(_) => (StatusCode::NOT_FOUND, ErrorResponse::message(&self)),
            Error::Store(e) => {
                error!("error reading measurements: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Failed to read measurements"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
