//! Request and response values passed through the router and middleware.
//! Independent of hyper: the server glue in `http.rs` converts at the edges.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::{Context, IdentityKey, ParamsKey};
use crate::pattern::Params;

/// Incoming request: method, path, headers, body, plus the request-scoped context.
#[derive(Clone, Debug, Default)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    context: Context,
}

impl Request {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            path: path.to_owned(),
            headers: Vec::new(),
            body: Vec::new(),
            context: Context::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First header with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Same request carrying a derived context.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Path parameters attached by the router; `None` before routing or on 404.
    pub fn params(&self) -> Option<&Params> {
        self.context.value::<ParamsKey>()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params().and_then(|p| p.get(name))
    }

    /// Identity attached by the access-token middleware.
    pub fn identity<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.context.value::<IdentityKey<T>>()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Response produced by a handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn text(status_code: u16, body: &str) -> Self {
        let mut resp = Self::new(status_code);
        resp.set_header("Content-Type", "text/plain; charset=utf-8");
        resp.body = body.as_bytes().to_vec();
        resp
    }

    pub fn json<T: Serialize + ?Sized>(status_code: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => {
                let mut resp = Self::new(status_code);
                resp.set_header("Content-Type", "application/json");
                resp.body = body;
                resp
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to encode response body");
                Self::error(500, "failed to encode response")
            }
        }
    }

    /// JSON error body: `{"error": "..."}`.
    pub fn error(status_code: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message });
        let mut resp = Self::new(status_code);
        resp.set_header("Content-Type", "application/json");
        resp.body = body.to_string().into_bytes();
        resp
    }

    pub fn not_found() -> Self {
        Self::text(404, "404 page not found")
    }

    pub fn unauthorized() -> Self {
        Self::text(401, "Unauthorized")
    }

    /// Set a header, replacing any existing value with the same name (case-insensitive).
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::new("get", "/").with_header("authorization", "Bearer t");
        assert_eq!(req.method, "GET");
        assert_eq!(req.header("Authorization"), Some("Bearer t"));
        assert_eq!(req.header("Content-Type"), None);
    }

    #[test]
    fn fresh_request_has_no_params_or_identity() {
        let req = Request::new("GET", "/accounts");
        assert!(req.params().is_none());
        assert!(req.identity::<String>().is_none());
    }

    #[test]
    fn set_header_replaces_existing() {
        let mut resp = Response::new(200);
        resp.set_header("content-type", "text/plain");
        resp.set_header("Content-Type", "application/json");
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn error_body_is_json() {
        let resp = Response::error(400, "bad input");
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "bad input" }));
        assert!(!resp.is_success());
    }
}
