//! CORS proxy server
//!
//! `GET /proxy?url=<target>` fetches the target and relays its status, body
//! and Content-Type, so a browser page can read sites that do not send CORS
//! headers. Every response, including errors, carries permissive CORS
//! headers, and `OPTIONS` on any path is answered with 204.

use std::collections::HashMap;
use std::future::Future;

use axum::extract::{Query, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;

use crate::config::FetchConfig;
use crate::error::{Result, SeoError};
use crate::fetch::{build_agent, classify_transport_error, validate_target, DEFAULT_CONTENT_TYPE};

const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-Requested-With, Accept";

/// Shared state for the proxy handlers
#[derive(Clone)]
pub struct ProxyState {
    agent: ureq::Agent,
    user_agent: String,
}

impl ProxyState {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            agent: build_agent(config),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// What came back from the target
struct Upstream {
    status: u16,
    content_type: String,
    body: Vec<u8>,
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/proxy", get(proxy_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: ProxyState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    log::info!("CORS proxy listening on http://{}/proxy?url=<target>", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    log::info!("CORS proxy stopped");
    Ok(())
}

/// Blocking entry point: bind `bind` and serve until Ctrl+C
pub fn run(bind: &str, config: &FetchConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let listener = TcpListener::bind(bind).await.map_err(|e| {
            SeoError::ConfigError(format!("Failed to bind proxy to {}: {}", bind, e))
        })?;
        serve(listener, ProxyState::new(config), async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Could not listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    })
}

async fn proxy_handler(
    State(state): State<ProxyState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let raw = match params.get("url").map(|u| u.trim()).filter(|u| !u.is_empty()) {
        Some(raw) => raw.to_string(),
        None => return error_response(StatusCode::BAD_REQUEST, "missing 'url' query parameter"),
    };

    let target = match validate_target(&raw) {
        Ok(target) => target,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    log::info!("Proxying {}", target);
    let ProxyState { agent, user_agent } = state;
    let result = tokio::task::spawn_blocking(move || forward(&agent, &user_agent, target.as_str())).await;

    match result {
        Ok(Ok(upstream)) => {
            log::debug!("Upstream answered {} ({} bytes)", upstream.status, upstream.body.len());
            relay(upstream)
        }
        Ok(Err(e)) => {
            log::warn!("Upstream request for {} failed: {}", raw, e);
            error_response(gateway_status(&e), &e.to_string())
        }
        Err(e) => {
            log::warn!("Upstream worker for {} failed: {}", raw, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "upstream worker failed")
        }
    }
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found; use GET /proxy?url=<target>")
}

/// Answer preflights directly and stamp CORS headers on everything else
async fn cors_middleware(request: Request, next: Next) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    apply_cors_headers(response.headers_mut(), origin);
    response
}

/// Echo the caller's Origin so credentialed requests are accepted; `*` otherwise
fn apply_cors_headers(headers: &mut HeaderMap, origin: Option<HeaderValue>) {
    if origin.is_some() {
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        origin.unwrap_or_else(|| HeaderValue::from_static("*")),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
}

fn forward(agent: &ureq::Agent, user_agent: &str, target: &str) -> Result<Upstream> {
    let response = agent
        .get(target)
        .header("User-Agent", user_agent)
        .call()
        .map_err(classify_transport_error)?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let body = response
        .into_body()
        .read_to_vec()
        .map_err(classify_transport_error)?;

    Ok(Upstream {
        status,
        content_type,
        body,
    })
}

fn relay(upstream: Upstream) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = HeaderValue::from_str(&upstream.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut response = (status, upstream.body).into_response();
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    response
}

/// 504 when the target never answered, 502 for anything else
fn gateway_status(err: &SeoError) -> StatusCode {
    match err {
        SeoError::Timeout | SeoError::Network(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_status() {
        assert_eq!(gateway_status(&SeoError::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            gateway_status(&SeoError::Network("connection refused".into())),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            gateway_status(&SeoError::EmptyContent("x".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_cors_headers_without_origin() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers, None);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
        assert!(!headers.contains_key(header::VARY));
    }

    #[test]
    fn test_cors_headers_echo_origin() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers, Some(HeaderValue::from_static("https://app.test")));
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.test");
        assert_eq!(headers[header::VARY], "Origin");
    }

    #[test]
    fn test_relay_defaults_bad_content_type() {
        let response = relay(Upstream {
            status: 404,
            content_type: "bad\nvalue".into(),
            body: b"gone".to_vec(),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
    }
}
