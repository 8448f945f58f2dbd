//! Middleware: `Handler -> Handler` wrappers, composed once when a route is registered.
//!
//! ```text
//! compose(&[cors(), access_token(auth)], terminal)
//!     == cors(access_token(auth)(terminal))
//! ```
//!
//! `cors` is meant to be outermost so that every response, 401s included, carries
//! the CORS headers.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::context::IdentityKey;
use crate::{handler_fn, Handler, Request, Response};

/// Transform applied to a handler at registration time.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header is not a bearer token")]
    InvalidScheme,
    #[error("invalid access token: {0}")]
    InvalidToken(String),
    #[error("token subject does not resolve to an identity")]
    UnknownIdentity,
}

/// Turns a bearer token into an identity. Implemented by the application on top of
/// its token verifier and account store.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    type Identity: Send + Sync + 'static;

    async fn authenticate(&self, token: &str) -> Result<Self::Identity, AuthError>;
}

/// Wrap `handler` in `middlewares`; the first middleware ends up outermost.
pub fn compose(middlewares: &[Middleware], handler: Handler) -> Handler {
    middlewares
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware(next))
}

/// Permissive CORS headers on every response. Never short-circuits.
pub fn cors() -> Middleware {
    Arc::new(with_cors_headers)
}

fn with_cors_headers(next: Handler) -> Handler {
    handler_fn(move |req: Request| {
        let next = Arc::clone(&next);
        async move {
            let mut resp = next(req).await;
            resp.set_header("Access-Control-Allow-Origin", ALLOW_ORIGIN);
            resp.set_header("Access-Control-Allow-Methods", ALLOW_METHODS);
            resp.set_header("Access-Control-Allow-Headers", ALLOW_HEADERS);
            resp
        }
    })
}

/// Require `Authorization: Bearer <token>`. On success the identity is attached to the
/// request context (on top of whatever the router attached) and the inner handler runs;
/// otherwise the chain stops with 401.
pub fn access_token<A: Authenticator>(authenticator: Arc<A>) -> Middleware {
    Arc::new(move |next: Handler| -> Handler {
        let authenticator = Arc::clone(&authenticator);
        handler_fn(move |req: Request| {
            let authenticator = Arc::clone(&authenticator);
            let next = Arc::clone(&next);
            async move {
                let identity = match authenticate(authenticator.as_ref(), &req).await {
                    Ok(identity) => identity,
                    Err(e) => {
                        tracing::debug!(method = %req.method, path = %req.path, reason = %e, "unauthorized");
                        return Response::unauthorized();
                    }
                };
                let context = match req.context().try_with_value::<IdentityKey<A::Identity>>(identity) {
                    Ok(context) => context,
                    Err(e) => {
                        tracing::error!(error = %e, path = %req.path, "cannot attach identity");
                        return Response::error(500, "internal server error");
                    }
                };
                next(req.with_context(context)).await
            }
        })
    })
}

async fn authenticate<A: Authenticator>(authenticator: &A, req: &Request) -> Result<A::Identity, AuthError> {
    let token = bearer_token(req)?;
    authenticator.authenticate(token).await
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(req: &Request) -> Result<&str, AuthError> {
    let header = req.header("Authorization").ok_or(AuthError::MissingHeader)?;
    let token = header.strip_prefix("Bearer ").ok_or(AuthError::InvalidScheme)?;
    if token.is_empty() {
        return Err(AuthError::InvalidToken("empty token".into()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticTokens;

    #[async_trait]
    impl Authenticator for StaticTokens {
        type Identity = String;

        async fn authenticate(&self, token: &str) -> Result<String, AuthError> {
            match token {
                "good" => Ok("ada@example.com".to_owned()),
                "orphan" => Err(AuthError::UnknownIdentity),
                other => Err(AuthError::InvalidToken(other.to_owned())),
            }
        }
    }

    fn echo_identity() -> Handler {
        handler_fn(|req: Request| async move {
            match req.identity::<String>() {
                Some(who) => Response::text(200, who),
                None => Response::text(200, "anonymous"),
            }
        })
    }

    #[test]
    fn bearer_token_parsing() {
        let req = Request::new("GET", "/");
        assert_eq!(bearer_token(&req), Err(AuthError::MissingHeader));
        let req = Request::new("GET", "/").with_header("Authorization", "Basic abc");
        assert_eq!(bearer_token(&req), Err(AuthError::InvalidScheme));
        let req = Request::new("GET", "/").with_header("Authorization", "Bearer ");
        assert!(matches!(bearer_token(&req), Err(AuthError::InvalidToken(_))));
        let req = Request::new("GET", "/").with_header("authorization", "Bearer abc.def");
        assert_eq!(bearer_token(&req), Ok("abc.def"));
    }

    #[tokio::test]
    async fn cors_decorates_every_response() {
        let handler = compose(&[cors()], handler_fn(|_req| async { Response::new(204) }));
        let resp = handler(Request::new("GET", "/")).await;
        assert_eq!(resp.status_code, 204);
        assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(resp.header("Access-Control-Allow-Methods"), Some(ALLOW_METHODS));
        assert_eq!(resp.header("Access-Control-Allow-Headers"), Some(ALLOW_HEADERS));
    }

    #[tokio::test]
    async fn access_token_attaches_identity() {
        let handler = compose(&[access_token(Arc::new(StaticTokens))], echo_identity());
        let resp = handler(Request::new("GET", "/").with_header("Authorization", "Bearer good")).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, b"ada@example.com");
    }

    #[tokio::test]
    async fn access_token_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let terminal = handler_fn(move |_req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Response::new(200) }
        });
        let handler = compose(&[cors(), access_token(Arc::new(StaticTokens))], terminal);

        for auth in [None, Some("Token good"), Some("Bearer bad"), Some("Bearer orphan")] {
            let mut req = Request::new("GET", "/");
            if let Some(value) = auth {
                req = req.with_header("Authorization", value);
            }
            let resp = handler(req).await;
            assert_eq!(resp.status_code, 401, "auth header {:?}", auth);
            assert_eq!(resp.header("Access-Control-Allow-Origin"), Some("*"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn compose_applies_first_middleware_outermost() {
        fn tag(label: &'static str) -> Middleware {
            Arc::new(move |next: Handler| -> Handler {
                handler_fn(move |req: Request| {
                    let next = Arc::clone(&next);
                    async move {
                        let mut resp = next(req).await;
                        resp.body.extend_from_slice(label.as_bytes());
                        resp
                    }
                })
            })
        }
        let handler = compose(&[tag("outer"), tag("inner")], handler_fn(|_req| async { Response::new(200) }));
        let resp = handler(Request::new("GET", "/")).await;
        assert_eq!(resp.body, b"innerouter");
    }

    #[tokio::test]
    async fn identity_already_present_is_not_overwritten() {
        let handler = compose(&[access_token(Arc::new(StaticTokens)), access_token(Arc::new(StaticTokens))], echo_identity());
        let resp = handler(Request::new("GET", "/").with_header("Authorization", "Bearer good")).await;
        assert_eq!(resp.status_code, 500);
    }
}
