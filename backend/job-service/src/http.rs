/// HTTP API for job service
///
/// POST   /jobs            - Post a job (EMPLOYER)
/// GET    /jobs            - List all jobs (any role)
/// GET    /jobs/my-jobs    - Jobs posted by the caller (EMPLOYER)
/// GET    /jobs/{id}       - Job detail (any role)
/// DELETE /jobs/{id}       - Remove a job (owning EMPLOYER only)
/// GET    /health          - Liveness (public)
use actix_middleware::{authorize, require_owner, ExemptPaths, Operation, TrustedIdentity, ANY_ROLE};
use actix_web::{web, HttpResponse};
use crypto_core::Role;
use error_types::ServiceError;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::models::CreateJobRequest;
use crate::store::JobStore;

pub const CREATE_JOB: Operation = Operation::new("create_job", &[Role::Employer]);
pub const LIST_JOBS: Operation = Operation::new("list_jobs", ANY_ROLE);
pub const GET_JOB: Operation = Operation::new("get_job", ANY_ROLE);
pub const MY_JOBS: Operation = Operation::new("my_jobs", &[Role::Employer]);
pub const DELETE_JOB: Operation = Operation::new("delete_job", &[Role::Employer]);

type HandlerResult = Result<HttpResponse, ServiceError>;

pub fn exempt_paths() -> ExemptPaths {
    ExemptPaths::new(["/health"])
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health))
        .service(
            web::scope("/jobs")
                .route("", web::post().to(create_job))
                .route("", web::get().to(list_jobs))
                // Before /{id} so "my-jobs" is not taken for an id
                .route("/my-jobs", web::get().to(my_jobs))
                .route("/{id}", web::get().to(get_job))
                .route("/{id}", web::delete().to(delete_job)),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn parse_job_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::not_found("job"))
}

async fn create_job(
    identity: TrustedIdentity,
    store: web::Data<JobStore>,
    body: web::Json<CreateJobRequest>,
) -> HandlerResult {
    authorize(&identity, &CREATE_JOB)?;

    let request = body.into_inner();
    request
        .validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let job = store.insert(request.into_job(identity.user_id));
    info!(job_id = %job.id, posted_by = %job.posted_by, "Job created");
    Ok(HttpResponse::Created().json(job))
}

async fn list_jobs(identity: TrustedIdentity, store: web::Data<JobStore>) -> HandlerResult {
    authorize(&identity, &LIST_JOBS)?;
    Ok(HttpResponse::Ok().json(store.list()))
}

async fn my_jobs(identity: TrustedIdentity, store: web::Data<JobStore>) -> HandlerResult {
    authorize(&identity, &MY_JOBS)?;
    Ok(HttpResponse::Ok().json(store.posted_by(identity.user_id)))
}

async fn get_job(
    identity: TrustedIdentity,
    store: web::Data<JobStore>,
    path: web::Path<String>,
) -> HandlerResult {
    authorize(&identity, &GET_JOB)?;

    let id = parse_job_id(&path)?;
    let job = store.get(id).ok_or_else(|| ServiceError::not_found("job"))?;
    Ok(HttpResponse::Ok().json(job))
}

async fn delete_job(
    identity: TrustedIdentity,
    store: web::Data<JobStore>,
    path: web::Path<String>,
) -> HandlerResult {
    authorize(&identity, &DELETE_JOB)?;

    let id = parse_job_id(&path)?;
    let job = store.get(id).ok_or_else(|| ServiceError::not_found("job"))?;
    require_owner(&identity, job.posted_by)?;

    store.remove(id);
    info!(job_id = %id, deleted_by = %identity.user_id, "Job deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Job;
    use actix_middleware::{TrustedIdentityMiddleware, USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
    use actix_web::test as actix_test;
    use actix_web::{http::StatusCode, App};
    use error_types::ErrorResponse;
    use serde_json::json;

    macro_rules! app {
        ($store:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data($store.clone())
                    .wrap(TrustedIdentityMiddleware::new(exempt_paths(), None))
                    .configure(configure),
            )
            .await
        };
    }

    fn as_user(req: actix_test::TestRequest, user_id: Uuid, role: Role) -> actix_test::TestRequest {
        req.insert_header((USER_ID_HEADER, user_id.to_string()))
            .insert_header((USER_EMAIL_HEADER, "caller@x.com"))
            .insert_header((USER_ROLE_HEADER, role.as_str()))
    }

    fn job_body(title: &str) -> serde_json::Value {
        json!({
            "title": title,
            "description": "Build the portal",
            "location": "Berlin",
            "company_name": "Acme",
            "salary": "80k",
            "job_type": "FULL_TIME"
        })
    }

    #[actix_web::test]
    async fn test_employer_creates_and_lists_own_jobs() {
        let store = web::Data::new(JobStore::new());
        let app = app!(store);
        let bob = Uuid::new_v4();
        let alice = Uuid::new_v4();

        for (owner, title) in [(bob, "Rust Dev"), (alice, "Go Dev"), (bob, "SRE")] {
            let req = as_user(actix_test::TestRequest::post().uri("/jobs"), owner, Role::Employer)
                .set_json(job_body(title))
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let job: Job = actix_test::read_body_json(resp).await;
            assert_eq!(job.posted_by, owner);
        }

        let req = as_user(actix_test::TestRequest::get().uri("/jobs/my-jobs"), bob, Role::Employer).to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let mine: Vec<Job> = actix_test::read_body_json(resp).await;
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|j| j.posted_by == bob));

        let req = as_user(actix_test::TestRequest::get().uri("/jobs"), Uuid::new_v4(), Role::Seeker).to_request();
        let all: Vec<Job> = actix_test::read_body_json(actix_test::call_service(&app, req).await).await;
        assert_eq!(all.len(), 3);
    }

    #[actix_web::test]
    async fn test_seeker_cannot_create_job() {
        let store = web::Data::new(JobStore::new());
        let app = app!(store);

        let req = as_user(actix_test::TestRequest::post().uri("/jobs"), Uuid::new_v4(), Role::Seeker)
            .set_json(job_body("Nope"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: ErrorResponse = actix_test::read_body_json(resp).await;
        assert_eq!(body.error, "FORBIDDEN");
        assert!(store.list().is_empty());

        let req = as_user(actix_test::TestRequest::get().uri("/jobs/my-jobs"), Uuid::new_v4(), Role::Seeker).to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_owner_is_taken_from_identity_not_body() {
        let store = web::Data::new(JobStore::new());
        let app = app!(store);
        let bob = Uuid::new_v4();

        let mut body = job_body("Rust Dev");
        body["posted_by"] = json!(Uuid::new_v4());
        let req = as_user(actix_test::TestRequest::post().uri("/jobs"), bob, Role::Employer)
            .set_json(body)
            .to_request();
        let job: Job = actix_test::read_body_json(actix_test::call_service(&app, req).await).await;
        assert_eq!(job.posted_by, bob);
    }

    #[actix_web::test]
    async fn test_invalid_job_body_is_400() {
        let store = web::Data::new(JobStore::new());
        let app = app!(store);

        let req = as_user(actix_test::TestRequest::post().uri("/jobs"), Uuid::new_v4(), Role::Employer)
            .set_json(job_body(""))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = as_user(actix_test::TestRequest::post().uri("/jobs"), Uuid::new_v4(), Role::Employer)
            .set_json(json!({ "title": "only a title" }))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_get_job_not_found() {
        let store = web::Data::new(JobStore::new());
        let app = app!(store);
        let caller = Uuid::new_v4();

        let req = as_user(actix_test::TestRequest::get().uri(&format!("/jobs/{}", Uuid::new_v4())), caller, Role::Seeker)
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = as_user(actix_test::TestRequest::get().uri("/jobs/42"), caller, Role::Seeker).to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_delete_is_employer_only() {
        assert!(DELETE_JOB.permits(Role::Employer));
        assert!(!DELETE_JOB.permits(Role::Admin));
        assert!(!DELETE_JOB.permits(Role::Seeker));
    }

    #[actix_web::test]
    async fn test_delete_requires_ownership() {
        let store = web::Data::new(JobStore::new());
        let bob = Uuid::new_v4();
        let job = store.insert(
            serde_json::from_value::<CreateJobRequest>(job_body("Rust Dev"))
                .unwrap()
                .into_job(bob),
        );
        let app = app!(store);
        let uri = format!("/jobs/{}", job.id);

        let other_employer = as_user(actix_test::TestRequest::delete().uri(&uri), Uuid::new_v4(), Role::Employer).to_request();
        assert_eq!(actix_test::call_service(&app, other_employer).await.status(), StatusCode::FORBIDDEN);

        // Deletion is an employer operation; ADMIN is refused by role
        let admin = as_user(actix_test::TestRequest::delete().uri(&uri), Uuid::new_v4(), Role::Admin).to_request();
        assert_eq!(actix_test::call_service(&app, admin).await.status(), StatusCode::FORBIDDEN);

        let seeker = as_user(actix_test::TestRequest::delete().uri(&uri), bob, Role::Seeker).to_request();
        assert_eq!(actix_test::call_service(&app, seeker).await.status(), StatusCode::FORBIDDEN);
        assert!(store.get(job.id).is_some());

        let owner = as_user(actix_test::TestRequest::delete().uri(&uri), bob, Role::Employer).to_request();
        assert_eq!(actix_test::call_service(&app, owner).await.status(), StatusCode::NO_CONTENT);
        assert!(store.get(job.id).is_none());

        let again = as_user(actix_test::TestRequest::delete().uri(&uri), bob, Role::Employer).to_request();
        assert_eq!(actix_test::call_service(&app, again).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_missing_identity_is_rejected() {
        let store = web::Data::new(JobStore::new());
        let app = app!(store);

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/jobs").to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
