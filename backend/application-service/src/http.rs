/// HTTP API for application service
///
/// POST /applications                      - Apply to a job (SEEKER)
/// GET  /applications/my-applications      - Caller's applications (SEEKER)
/// GET  /applications/job/{job_id}         - Applications to an owned job (EMPLOYER)
/// PUT  /applications/{id}/status?status=  - Change status on an owned job (EMPLOYER)
/// GET  /health                            - Liveness (public)
use actix_middleware::{authorize, CorrelationId, ExemptPaths, Operation, TrustedIdentity};
use actix_web::{web, HttpResponse};
use crypto_core::Role;
use error_types::ServiceError;
use uuid::Uuid;

use crate::models::{ApplyRequest, StatusQuery};
use crate::service::ApplicationService;

pub const APPLY: Operation = Operation::new("apply", &[Role::Seeker]);
pub const MY_APPLICATIONS: Operation = Operation::new("my_applications", &[Role::Seeker]);
pub const APPLICATIONS_FOR_JOB: Operation = Operation::new("applications_for_job", &[Role::Employer]);
pub const UPDATE_STATUS: Operation = Operation::new("update_application_status", &[Role::Employer]);

type HandlerResult = Result<HttpResponse, ServiceError>;

pub fn exempt_paths() -> ExemptPaths {
    ExemptPaths::new(["/health"])
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(16 * 1024)
            .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into()),
    )
    .route("/health", web::get().to(health))
    .service(
        web::scope("/applications")
            .route("", web::post().to(apply))
            .route("/my-applications", web::get().to(my_applications))
            .route("/job/{job_id}", web::get().to(applications_for_job))
            .route("/{id}/status", web::put().to(update_status)),
    );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn parse_id(raw: &str, resource: &'static str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::not_found(resource))
}

/// Set by `CorrelationIdMiddleware`; absent when the app is mounted without it
type Correlation = Option<web::ReqData<CorrelationId>>;

fn correlation_str(correlation: &Correlation) -> Option<&str> {
    correlation.as_ref().map(|id| id.0.as_str())
}

async fn apply(
    identity: TrustedIdentity,
    correlation: Correlation,
    service: web::Data<ApplicationService>,
    body: web::Json<ApplyRequest>,
) -> HandlerResult {
    authorize(&identity, &APPLY)?;
    let application = service
        .apply(&identity, body.job_id, correlation_str(&correlation))
        .await?;
    Ok(HttpResponse::Created().json(application))
}

async fn my_applications(
    identity: TrustedIdentity,
    service: web::Data<ApplicationService>,
) -> HandlerResult {
    authorize(&identity, &MY_APPLICATIONS)?;
    Ok(HttpResponse::Ok().json(service.my_applications(&identity)))
}

async fn applications_for_job(
    identity: TrustedIdentity,
    correlation: Correlation,
    service: web::Data<ApplicationService>,
    path: web::Path<String>,
) -> HandlerResult {
    authorize(&identity, &APPLICATIONS_FOR_JOB)?;
    let job_id = parse_id(&path, "job")?;
    let applications = service
        .applications_for_job(&identity, job_id, correlation_str(&correlation))
        .await?;
    Ok(HttpResponse::Ok().json(applications))
}

async fn update_status(
    identity: TrustedIdentity,
    correlation: Correlation,
    service: web::Data<ApplicationService>,
    path: web::Path<String>,
    query: web::Query<StatusQuery>,
) -> HandlerResult {
    authorize(&identity, &UPDATE_STATUS)?;
    let id = parse_id(&path, "application")?;
    let application = service
        .update_status(&identity, id, query.status, correlation_str(&correlation))
        .await?;
    Ok(HttpResponse::Ok().json(application))
}
