//! Route table for the API. Order matters under `TieBreak::LastMatch`:
//! `/activities/types` is registered after `/activities/{activityId}` so it wins.

use std::future::Future;
use std::sync::Arc;

use tracker_core::{access_token, compose, cors, handler_fn, Handler, Middleware, Request, Response, Router, RouterError, TieBreak};

use crate::api::{self, AppState};
use crate::auth::AccountAuthenticator;

/// Build the router with every API route registered and its middleware composed.
pub fn build_router(state: AppState, tie_break: TieBreak) -> Result<Router, RouterError> {
    let authenticator = Arc::new(AccountAuthenticator::new(
        Arc::clone(&state.tokens),
        Arc::clone(&state.store),
    ));
    let public: Vec<Middleware> = vec![cors()];
    let protected: Vec<Middleware> = vec![cors(), access_token(authenticator)];

    let mut router = Router::with_tie_break(tie_break);
    router.add_route("/", handler_fn(api::hello))?;
    router.add_route("/auth/signup", compose(&public, bind(&state, api::auth::signup)))?;
    router.add_route("/auth/tokens/access", compose(&public, bind(&state, api::auth::access_token)))?;
    router.add_route("/activities", compose(&protected, bind(&state, api::activities::activities)))?;
    router.add_route(
        "/activities/{activityId}",
        compose(&protected, bind(&state, api::activities::activity_by_id)),
    )?;
    router.add_route(
        "/activities/types",
        compose(&protected, bind(&state, api::activities::activity_types)),
    )?;
    router.add_route(
        "/activities/types/{typeId}",
        compose(&protected, bind(&state, api::activities::activity_type_by_id)),
    )?;
    router.add_route("/accounts", compose(&protected, bind(&state, api::accounts::accounts)))?;
    router.add_route(
        "/accounts/{accountId}",
        compose(&protected, bind(&state, api::accounts::account_by_id)),
    )?;
    Ok(router)
}

/// Close a handler over a clone of the state.
fn bind<F, Fut>(state: &AppState, f: F) -> Handler
where
    F: Fn(AppState, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let state = state.clone();
    handler_fn(move |req| f(state.clone(), req))
}
