/// HTTP API for identity service
///
/// POST /identity/register          - Create account (public)
/// POST /identity/login             - Exchange credentials for a token (public)
/// GET  /identity/users/{id}        - Look up a user (authenticated)
/// GET  /identity/users/email/{e}   - Look up a user by email (authenticated)
/// GET  /health                     - Liveness (public)
use actix_middleware::{authorize, ExemptPaths, Operation, TrustedIdentity, ANY_ROLE};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use error_types::ServiceError;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{LoginRequest, RegisterRequest};
use crate::services::IdentityService;

const LOOKUP_USER: Operation = Operation::new("lookup_user", ANY_ROLE);

/// Routes reachable without a trusted identity
pub fn exempt_paths() -> ExemptPaths {
    ExemptPaths::new(["/identity/register", "/identity/login", "/health"])
}

/// Malformed JSON bodies answer with the shared 400 body
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health))
        .service(
            web::scope("/identity")
                .route("/register", web::post().to(register))
                .route("/login", web::post().to(login))
                // Registered before /users/{id} so "email" is not parsed as an id
                .route("/users/email/{email}", web::get().to(lookup_by_email))
                .route("/users/{id}", web::get().to(lookup)),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn register(
    service: web::Data<IdentityService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    info!("POST /identity/register");
    let user = service.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

async fn login(
    service: web::Data<IdentityService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let response = service.login(body.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn lookup(
    identity: TrustedIdentity,
    service: web::Data<IdentityService>,
    path: web::Path<String>,
) -> std::result::Result<HttpResponse, actix_web::Error> {
    authorize(&identity, &LOOKUP_USER)?;

    // Unparseable ids cannot exist
    let id = Uuid::parse_str(&path.into_inner()).map_err(|_| ServiceError::not_found("user"))?;
    let user = service.lookup(id).await?;
    Ok(HttpResponse::Ok().json(user))
}

async fn lookup_by_email(
    identity: TrustedIdentity,
    service: web::Data<IdentityService>,
    path: web::Path<String>,
) -> std::result::Result<HttpResponse, actix_web::Error> {
    authorize(&identity, &LOOKUP_USER)?;

    let user = service.lookup_by_email(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}
