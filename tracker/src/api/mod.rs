//! Terminal handlers for the REST API. Each one switches on the method, runs
//! against `AppState`, and maps failures through `ApiError`.

pub mod accounts;
pub mod activities;
pub mod auth;

use std::sync::Arc;

use tracker_core::{Request, Response};

use crate::auth::{PasswordHasher, TokenService};
use crate::core::ApiError;
use crate::domain::{Account, Store};

/// Shared collaborators, cloned into every handler closure at registration.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub hasher: Arc<dyn PasswordHasher>,
}

pub async fn hello(_req: Request) -> Response {
    Response::text(200, "hello")
}

/// Numeric path parameter; missing or non-numeric is a 400.
pub(crate) fn id_param(req: &Request, name: &str) -> Result<i64, ApiError> {
    let raw = req
        .param(name)
        .ok_or_else(|| ApiError::BadRequest(format!("missing path parameter {}", name)))?;
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be an integer, got {:?}", name, raw)))
}

/// The account attached by the access-token middleware.
pub(crate) fn caller(req: &Request) -> Result<&Account, ApiError> {
    req.identity::<Account>().ok_or(ApiError::MissingIdentity)
}

pub(crate) fn method_not_allowed(req: &Request) -> ApiError {
    ApiError::MethodNotAllowed(req.method.clone())
}
