//! `/auth/signup` and `/auth/tokens/access`.

use serde::Deserialize;
use tracker_core::{Request, Response};

use super::{method_not_allowed, AppState};
use crate::core::{respond, ApiError};
use crate::domain::{AuthAccount, NewAccount};

#[derive(Deserialize)]
struct SignupBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

pub async fn signup(state: AppState, req: Request) -> Response {
    respond(match req.method.as_str() {
        "POST" => create_account(&state, &req),
        _ => Err(method_not_allowed(&req)),
    })
}

pub async fn access_token(state: AppState, req: Request) -> Response {
    respond(match req.method.as_str() {
        "POST" => issue_token(&state, &req),
        _ => Err(method_not_allowed(&req)),
    })
}

fn create_account(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    let body: SignupBody = req.json()?;
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest("email and password are required".into()));
    }
    let password_hash = state.hasher.hash(&body.password)?;
    let account = state.store.create_account(NewAccount {
        name: body.name,
        email: body.email,
        password_hash,
    })?;
    let access_token = state.tokens.issue(&account.email)?;
    tracing::info!(account_id = account.id, "account created");
    Ok(Response::json(201, &AuthAccount { account, access_token }))
}

fn issue_token(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    let body: LoginBody = req.json()?;
    let credentials = state
        .store
        .credentials_by_email(&body.email)?
        .ok_or(ApiError::InvalidCredentials)?;
    if !state.hasher.verify(&body.password, &credentials.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }
    let access_token = state.tokens.issue(&credentials.account.email)?;
    Ok(Response::json(
        200,
        &AuthAccount {
            account: credentials.account,
            access_token,
        },
    ))
}
