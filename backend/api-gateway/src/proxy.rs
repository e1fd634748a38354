//! Reverse proxy to the upstream services
//!
//! Requests that pass [`GatewayAuth`](crate::middleware::GatewayAuth) are
//! forwarded by path prefix. One attempt per request; failures surface as 502.

use actix_middleware::matches_prefix;
use actix_web::{
    http::{header::HeaderName as ActixHeaderName, StatusCode},
    web, HttpRequest, HttpResponse,
};
use error_types::ServiceError;
use reqwest::header::{HeaderMap as UpstreamHeaders, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, error};

/// Connection-scoped headers that must not cross the proxy
const HOP_BY_HOP: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Header names a `Connection` value declares connection-scoped (RFC 7230 §6.1)
fn connection_tokens<'a>(values: impl Iterator<Item = &'a [u8]>) -> Vec<String> {
    values
        .filter_map(|v| std::str::from_utf8(v).ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_forwardable(name: &str, connection_scoped: &[String]) -> bool {
    !is_hop_by_hop(name) && !connection_scoped.iter().any(|t| name.eq_ignore_ascii_case(t))
}

/// Inbound headers to send upstream
fn upstream_headers(req: &HttpRequest) -> UpstreamHeaders {
    let connection_scoped = connection_tokens(
        req.headers()
            .get_all(actix_web::http::header::CONNECTION)
            .map(|v| v.as_bytes()),
    );

    let mut headers = UpstreamHeaders::new();
    for (name, value) in req.headers() {
        if !is_forwardable(name.as_str(), &connection_scoped) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }
    headers
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub upstream: String,
}

/// Path prefix → upstream base URL, longest prefix wins
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, prefix: &str, upstream: &str) -> Self {
        self.routes.push(Route {
            prefix: prefix.trim_end_matches('/').to_string(),
            upstream: upstream.trim_end_matches('/').to_string(),
        });
        self.routes
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        self
    }

    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| matches_prefix(path, &r.prefix))
            .map(|r| r.upstream.as_str())
    }
}

pub struct Proxy {
    client: reqwest::Client,
    routes: RouteTable,
}

impl Proxy {
    pub fn new(routes: RouteTable, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, routes })
    }

    pub async fn forward(&self, req: &HttpRequest, body: web::Bytes) -> Result<HttpResponse, ServiceError> {
        let upstream = self
            .routes
            .resolve(req.path())
            .ok_or_else(|| ServiceError::not_found("route"))?;

        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| req.path());
        let url = format!("{}{}", upstream, path_and_query);

        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
            .map_err(|_| ServiceError::Validation("unsupported method".into()))?;

        let headers = upstream_headers(req);

        debug!(method = %method, upstream = %upstream, path = %req.path(), "Forwarding request");

        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(upstream = %upstream, error = %e, "Upstream request failed");
                ServiceError::Upstream(e.to_string())
            })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        let connection_scoped = connection_tokens(
            response
                .headers()
                .get_all(reqwest::header::CONNECTION)
                .iter()
                .map(|v| v.as_bytes()),
        );

        let mut builder = HttpResponse::build(status);
        for (name, value) in response.headers() {
            if !is_forwardable(name.as_str(), &connection_scoped) {
                continue;
            }
            if let Ok(name) = ActixHeaderName::from_bytes(name.as_str().as_bytes()) {
                if let Ok(value) = actix_web::http::header::HeaderValue::from_bytes(value.as_bytes()) {
                    builder.append_header((name, value));
                }
            }
        }

        let bytes = response.bytes().await.map_err(|e| {
            error!(upstream = %upstream, error = %e, "Failed to read upstream response body");
            ServiceError::Upstream(e.to_string())
        })?;

        Ok(builder.body(bytes))
    }
}

/// Catch-all handler behind the gateway middleware stack
pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    proxy: web::Data<Proxy>,
) -> Result<HttpResponse, ServiceError> {
    proxy.forward(&req, body).await
}
