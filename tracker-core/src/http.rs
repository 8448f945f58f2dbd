//! Async HTTP server: tokio + hyper. Converts each hyper request into a core `Request`,
//! runs it through `Router::dispatch`, and converts the `Response` back.
//! One spawned task per connection; the router is shared read-only behind an `Arc`.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::{CoreError, Request, Response, Router};

/// Accept connections until `shutdown` resolves.
pub async fn serve<F>(router: Arc<Router>, listener: TcpListener, shutdown: F) -> Result<(), CoreError>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, routes = router.len(), tie_break = ?router.tie_break(), "HTTP server listening");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown requested, no longer accepting connections");
                break;
            }
            accept_result = listener.accept() => {
                let (stream, peer) = match accept_result {
                    Ok(x) => x,
                    Err(e) => {
                        tracing::warn!(error = %e, "accept error");
                        continue;
                    }
                };
                let io = TokioIo::new(stream);
                let router = Arc::clone(&router);
                tokio::task::spawn(async move {
                    let service = service_fn(move |req: HyperRequest<hyper::body::Incoming>| {
                        let router = Arc::clone(&router);
                        async move { handle(router, req).await }
                    });
                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        tracing::debug!(peer = %peer, error = %e, "connection closed with error");
                    }
                });
            }
        }
    }
    Ok(())
}

/// Bind `host:port` and serve on a fresh multi-threaded runtime until Ctrl-C (blocks).
pub fn run(router: Router, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = format!("{}:{}", host, port);
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(async move {
        let listener = TcpListener::bind(&addr).await?;
        serve(Arc::new(router), listener, shutdown_signal()).await?;
        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn handle(
    router: Arc<Router>,
    req: HyperRequest<hyper::body::Incoming>,
) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let req = match into_core_request(req).await {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request");
            return Ok(into_hyper_response(Response::error(400, &e.to_string())));
        }
    };
    let method = req.method.clone();
    let path = req.path.clone();
    let resp = router.dispatch(req).await;
    tracing::info!(method = %method, path = %path, status = resp.status_code, "request handled");
    Ok(into_hyper_response(resp))
}

async fn into_core_request(req: HyperRequest<hyper::body::Incoming>) -> Result<Request, CoreError> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();
    let body = req.into_body().collect().await?.to_bytes();
    let mut core = Request::new(&method, &path).with_body(body.to_vec());
    core.headers = headers;
    Ok(core)
}

fn into_hyper_response(resp: Response) -> HyperResponse<Full<Bytes>> {
    let mut b = HyperResponse::builder().status(resp.status_code);
    for (k, v) in &resp.headers {
        b = b.header(k.as_str(), v.as_str());
    }
    match b.body(Full::new(Bytes::from(resp.body))) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, status = resp.status_code, "invalid response, sending 500");
            let mut r = HyperResponse::new(Full::new(Bytes::new()));
            *r.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            r
        }
    }
}
