//! Logging middleware
//!
//! Logs HTTP request/response information using tracing. Only method, path,
//! status and timing are recorded; headers and bodies may carry credentials.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Instant;

use crate::correlation_id::CORRELATION_ID_HEADER;

/// Middleware that logs HTTP requests and responses
#[derive(Clone, Default)]
pub struct Logging;

impl<S, B> Transform<S, ServiceRequest> for Logging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggingService { service }))
    }
}

pub struct LoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for LoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.path().to_string();

        tracing::debug!(
            method = %method,
            path = %path,
            "HTTP request started"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await;
            let elapsed = start.elapsed();

            match &res {
                Ok(res) => {
                    let correlation_id = res
                        .headers()
                        .get(CORRELATION_ID_HEADER)
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        method = %method,
                        path = %path,
                        status = res.status().as_u16(),
                        duration_ms = elapsed.as_millis() as u64,
                        correlation_id = %correlation_id,
                        "HTTP request completed"
                    );
                }
                Err(e) => {
                    // Short-circuited by an inner middleware; rendered by the server
                    tracing::info!(
                        method = %method,
                        path = %path,
                        status = e.as_response_error().status_code().as_u16(),
                        duration_ms = elapsed.as_millis() as u64,
                        "HTTP request rejected"
                    );
                }
            }

            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_logging_passes_response_through() {
        let app = test::init_service(
            App::new()
                .wrap(Logging)
                .route("/", web::get().to(|| async { HttpResponse::Created().finish() })),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
