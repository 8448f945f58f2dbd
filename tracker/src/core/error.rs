//! ApiError: every failure a terminal handler can hit, mapped to a status code in one place.

use thiserror::Error;
use tracker_core::Response;

use crate::auth::{PasswordError, TokenError};
use crate::domain::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
    #[error("route is not behind the access-token middleware")]
    MissingIdentity,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("invalid JSON body: {}", e))
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::InvalidCredentials => 401,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Store(StoreError::DuplicateEmail(_)) => 409,
            ApiError::Store(StoreError::UnknownActivityType(_)) => 400,
            ApiError::MissingIdentity
            | ApiError::Store(StoreError::Poisoned)
            | ApiError::Token(_)
            | ApiError::Password(_) => 500,
        }
    }

    /// Internal failures are logged and answered with a generic message.
    pub fn into_response(self) -> Response {
        let status = self.status_code();
        if status >= 500 {
            tracing::error!(error = %self, "request failed");
            return Response::error(status, "internal server error");
        }
        Response::error(status, &self.to_string())
    }
}

/// Turn a handler result into the response sent back.
pub fn respond(result: Result<Response, ApiError>) -> Response {
    result.unwrap_or_else(ApiError::into_response)
}
