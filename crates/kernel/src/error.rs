//! Application error types.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised by the facet search pipeline.
///
/// Query building itself is infallible; only loading configuration and
/// round-tripping to storage can fail.
#[derive(Debug, Error)]
pub enum FacetError {
    /// Malformed or missing configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend failure (connectivity, syntax, statement timeout).
    #[error("{context}")]
    QueryExecution {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The render pass did not finish before its deadline.
    #[error("search did not complete within {0:?}")]
    DeadlineExceeded(Duration),

    /// A value produced by the query builder has no PostgreSQL binding.
    #[error("unsupported bind value: {0}")]
    UnsupportedBindValue(String),

    /// A query task panicked or was cancelled.
    #[error("search task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl FacetError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        FacetError::Config(message.into())
    }
}

/// Problems with a single request parameter.
///
/// These never reach the client: the parameter store logs them and falls
/// back to a safe default or drops the parameter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("parameter `{param}` has invalid value `{value}`")]
    InvalidValue { param: String, value: String },

    #[error("`{column}` is not a configured {kind} column")]
    UnknownColumn { column: String, kind: &'static str },

    #[error("parameter `{param}` takes a single value but a list was supplied")]
    UnexpectedList { param: String },
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("search failed")]
    Search(#[from] FacetError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Search(FacetError::DeadlineExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Details go to the log; the client only sees a generic message.
        match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
            }
            AppError::Search(e) => {
                tracing::error!(error = %e, source = ?std::error::Error::source(e), "search failed");
            }
        }

        (status, self.to_string()).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
