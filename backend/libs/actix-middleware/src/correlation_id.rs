//! Request correlation ID middleware
//!
//! Extracts or generates a correlation ID per request and echoes it back on
//! the response. The ID is also written into the request headers, so the
//! gateway proxy forwards it and downstream logs share it.
//!
//! ## Design
//! - If request has a usable X-Correlation-ID header: use it
//! - Otherwise: generate UUID v4
//! - Store in request extensions for access by handlers
//!
//! ## Example
//! ```rust
//! use actix_middleware::CorrelationIdMiddleware;
//! use actix_web::App;
//!
//! let app = App::new()
//!     .wrap(CorrelationIdMiddleware);
//! ```

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Longer inbound IDs are replaced rather than propagated
const MAX_CORRELATION_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

/// Middleware that manages request correlation IDs
#[derive(Clone)]
pub struct CorrelationIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for CorrelationIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CorrelationIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorrelationIdMiddlewareService { service }))
    }
}

pub struct CorrelationIdMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CorrelationIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let inbound = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty() && s.len() <= MAX_CORRELATION_ID_LEN)
            .map(|s| s.to_string());

        let (correlation_id, header_value) = match inbound {
            Some(id) => match HeaderValue::from_str(&id) {
                Ok(value) => (id, value),
                Err(_) => generate(),
            },
            None => generate(),
        };

        req.headers_mut()
            .insert(HeaderName::from_static(CORRELATION_ID_HEADER), header_value.clone());
        req.extensions_mut()
            .insert(CorrelationId(correlation_id));

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            res.headers_mut()
                .insert(HeaderName::from_static(CORRELATION_ID_HEADER), header_value);
            Ok(res)
        })
    }
}

fn generate() -> (String, HeaderValue) {
    let id = Uuid::new_v4().to_string();
    // A hyphenated UUID is always a valid header value
    let value = HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    (id, value)
}

/// Extract correlation ID from request extensions
///
/// ## Example
/// ```rust
/// use actix_middleware::get_correlation_id;
/// use actix_web::HttpRequest;
///
/// fn handler(req: HttpRequest) -> String {
///     let id = get_correlation_id(&req);
///     format!("Request ID: {}", id)
/// }
/// ```
pub fn get_correlation_id(req: &actix_web::HttpRequest) -> String {
    req.extensions()
        .get::<CorrelationId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
