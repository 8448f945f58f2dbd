//! Tracker core: path-pattern routing, request context, middleware chain, HTTP server.
//!
//! The router owns an append-only table of `(pattern, handler)` pairs. A request
//! flows through it like this:
//!
//! ```text
//! hyper request
//!     → http.rs (collect body, build core Request with an empty Context)
//!     → router.rs (split path, match every route, pick one by TieBreak)
//!     → Context += path parameters
//!     → composed handler: cors → access_token (Context += identity) → terminal handler
//!     → core Response → hyper response
//! ```

pub mod context;
pub mod http;
pub mod middleware;
pub mod pattern;
pub mod request;
pub mod router;

pub use context::{Context, ContextError, ContextKey};
pub use middleware::{access_token, compose, cors, AuthError, Authenticator, Middleware};
pub use pattern::{Params, Pattern, Segment};
pub use request::{Request, Response};
pub use router::{RouteMatch, Router, TieBreak};

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Server-level failures. Routing and auth failures never show up here: they
/// are turned into responses inside the router and the middleware.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Hyper(#[from] hyper::Error),
}

/// Registration-time failures. Returned by `Router::add_route`; callers are
/// expected to abort startup on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("malformed route pattern {pattern:?}: {reason}")]
    MalformedPattern { pattern: String, reason: String },
}

/// Boxed response future returned by every handler.
pub type BoxFuture = futures_util::future::BoxFuture<'static, Response>;

/// Handler: takes the request (with its context) and produces the response exactly once.
/// Terminal handlers and middleware-wrapped handlers share this type.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// Wrap an async function or closure as a `Handler`.
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| -> BoxFuture { Box::pin(f(req)) })
}
