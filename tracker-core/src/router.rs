//! Route table and dispatch.
//!
//! Routes are appended at startup and never change afterwards, so the router can be
//! shared behind an `Arc` and read without locks. Dispatch scans the whole table
//! (O(routes × segments)); which matching route wins is decided by `TieBreak`.

use serde::Deserialize;

use crate::context::ParamsKey;
use crate::pattern::{decode_path, split_path, Params, Pattern};
use crate::{handler_fn, Handler, Request, Response, RouterError};

/// Which route wins when several patterns match the same path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Every matching route overwrites the previous pick: the last registered one wins.
    #[default]
    LastMatch,
    /// The route with the most literal segments wins; on a tie, the first registered one.
    MostSpecific,
}

struct Route {
    pattern: Pattern,
    handler: Handler,
}

/// Result of a lookup without dispatching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub pattern: &'a str,
    pub params: Params,
}

pub struct Router {
    routes: Vec<Route>,
    tie_break: TieBreak,
    not_found: Handler,
}

impl Router {
    pub fn new() -> Self {
        Self::with_tie_break(TieBreak::default())
    }

    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self {
            routes: Vec::new(),
            tie_break,
            not_found: handler_fn(|_req| async { Response::not_found() }),
        }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Append a route. The pattern is validated here; duplicates and overlaps are accepted.
    pub fn add_route(&mut self, pattern: &str, handler: Handler) -> Result<(), RouterError> {
        let pattern = Pattern::parse(pattern)?;
        tracing::debug!(pattern = %pattern, index = self.routes.len(), "route registered");
        self.routes.push(Route { pattern, handler });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Look up the route that would handle `path`, without calling it.
    /// `path` is percent-decoded first; a path that does not decode to UTF-8 matches nothing.
    pub fn match_route(&self, path: &str) -> Option<RouteMatch<'_>> {
        let decoded = decode_path(path).ok()?;
        self.select(&decoded).map(|(route, params)| RouteMatch {
            pattern: route.pattern.as_str(),
            params,
        })
    }

    /// Route the request, attach the captured parameters to its context and run the handler.
    /// Matching runs on the percent-decoded path. Unmatched paths get a 404; paths that
    /// do not decode to UTF-8 get a 400.
    pub async fn dispatch(&self, req: Request) -> Response {
        let selected = match decode_path(&req.path) {
            Ok(decoded) => self.select(&decoded),
            Err(e) => {
                tracing::debug!(path = %req.path, error = %e, "undecodable path");
                return Response::error(400, "request path is not valid UTF-8 once decoded");
            }
        };
        let Some((route, params)) = selected else {
            tracing::debug!(method = %req.method, path = %req.path, "no route matched");
            return (self.not_found)(req).await;
        };
        tracing::debug!(
            method = %req.method,
            path = %req.path,
            pattern = %route.pattern,
            params = params.len(),
            "route matched"
        );
        let context = match req.context().try_with_value::<ParamsKey>(params) {
            Ok(context) => context,
            Err(e) => {
                tracing::error!(error = %e, path = %req.path, "cannot attach path parameters");
                return Response::error(500, "internal server error");
            }
        };
        (route.handler)(req.with_context(context)).await
    }

    fn select(&self, path: &str) -> Option<(&Route, Params)> {
        let incoming = split_path(path);
        let mut selected: Option<(&Route, Params)> = None;
        for route in &self.routes {
            let Some(params) = route.pattern.matches(&incoming) else {
                continue;
            };
            selected = match (self.tie_break, selected) {
                (TieBreak::MostSpecific, Some(current))
                    if current.0.pattern.literal_count() >= route.pattern.literal_count() =>
                {
                    Some(current)
                }
                _ => Some((route, params)),
            };
        }
        selected
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
