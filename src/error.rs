//! Per-request failures and their HTTP status mapping.

use crate::http::parser::ParseError;
use crate::http::response::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while answering one request.
///
/// None of these escape the connection: each becomes a status code.
/// Traversal attempts are reported as [`ServeError::NotFound`] so that a
/// client cannot tell them apart from files that do not exist.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] ParseError),

    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(#[from] std::io::Error),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::MalformedRequest(_) => StatusCode::BadRequest,
            ServeError::NotFound => StatusCode::NotFound,
            ServeError::Internal(_) => StatusCode::InternalServerError,
        }
    }
}
