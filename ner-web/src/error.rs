//! Erros da API HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ner_spans::NerError;
use serde::Serialize;
use thiserror::Error;

/// Erro devolvido pelos handlers.
#[derive(Debug, Error)]
#[error("[{status}] {code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<NerError> for ApiError {
    fn from(err: NerError) -> Self {
        match err {
            NerError::UpstreamInference { .. } => {
                ApiError::new(StatusCode::BAD_GATEWAY, "UPSTREAM_INFERENCE", err.to_string())
            }
            NerError::Configuration(_) | NerError::Serialization(_) => ApiError::internal(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::internal(format!("tarefa de análise abortada: {err}"))
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        ApiError::internal(format!("falha ao renderizar template: {err}"))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
