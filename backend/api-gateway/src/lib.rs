//! API Gateway
//!
//! Single entry point for clients. Verifies bearer tokens, injects the
//! caller's identity as trusted headers and forwards to the owning service.
//!
//! Stage order, outermost first: request logging → correlation id →
//! [`GatewayAuth`](middleware::GatewayAuth) → [`proxy`].

pub mod config;
pub mod middleware;
pub mod proxy;

use config::ServiceEndpoints;
use proxy::RouteTable;

/// Route table for the job portal upstreams
pub fn routes(services: &ServiceEndpoints) -> RouteTable {
    RouteTable::new()
        .route("/identity", &services.identity_service)
        .route("/jobs", &services.job_service)
        .route("/applications", &services.application_service)
}

pub async fn health() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
