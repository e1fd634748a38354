//! Trusted identity propagated by the gateway
//!
//! The gateway verifies the bearer token once and forwards the caller's
//! identity as plain headers. Downstream services never see the token; they
//! wrap their routes in [`TrustedIdentityMiddleware`], which rebuilds a
//! [`TrustedIdentity`] from those headers and rejects the request with 401 when
//! they are missing or malformed.
//!
//! ## Example
//! ```rust,no_run
//! use actix_middleware::{ExemptPaths, TrustedIdentity, TrustedIdentityMiddleware};
//! use actix_web::{web, App, HttpResponse};
//!
//! async fn whoami(identity: TrustedIdentity) -> HttpResponse {
//!     HttpResponse::Ok().body(identity.email)
//! }
//!
//! let app = App::new()
//!     .wrap(TrustedIdentityMiddleware::new(ExemptPaths::new(["/health"]), None))
//!     .route("/whoami", web::get().to(whoami));
//! ```

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use crypto_core::Role;
use error_types::ServiceError;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::exempt::ExemptPaths;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const INTERNAL_API_KEY_HEADER: &str = "x-internal-api-key";

/// Headers only the gateway may set; anything a client sends under these names is dropped
pub const GATEWAY_ONLY_HEADERS: [&str; 4] = [
    USER_ID_HEADER,
    USER_EMAIL_HEADER,
    USER_ROLE_HEADER,
    INTERNAL_API_KEY_HEADER,
];

/// Caller identity established by the gateway for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedIdentity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityHeaderError {
    #[error("missing header: {0}")]
    Missing(&'static str),

    #[error("malformed header: {0}")]
    Malformed(&'static str),
}

impl TrustedIdentity {
    pub fn new(user_id: Uuid, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    /// Rebuild the identity from `X-User-Id`, `X-User-Email` and `X-User-Role`
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, IdentityHeaderError> {
        let user_id = header_str(headers, USER_ID_HEADER)?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| IdentityHeaderError::Malformed(USER_ID_HEADER))?;

        let email = header_str(headers, USER_EMAIL_HEADER)?;
        if email.is_empty() {
            return Err(IdentityHeaderError::Malformed(USER_EMAIL_HEADER));
        }

        let role = header_str(headers, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(|_| IdentityHeaderError::Malformed(USER_ROLE_HEADER))?;

        Ok(Self::new(user_id, email, role))
    }

    /// Write the identity headers, replacing any existing values
    pub fn write_headers(&self, headers: &mut HeaderMap) -> Result<(), IdentityHeaderError> {
        for (name, value) in self.propagation_headers() {
            let value = HeaderValue::from_str(&value)
                .map_err(|_| IdentityHeaderError::Malformed(name))?;
            headers.insert(HeaderName::from_static(name), value);
        }
        Ok(())
    }

    /// Headers to attach when calling another internal service on behalf of this caller
    pub fn propagation_headers(&self) -> [(&'static str, String); 3] {
        [
            (USER_ID_HEADER, self.user_id.to_string()),
            (USER_EMAIL_HEADER, self.email.clone()),
            (USER_ROLE_HEADER, self.role.to_string()),
        ]
    }

    pub fn is_owner(&self, owner_id: &Uuid) -> bool {
        &self.user_id == owner_id
    }
}

fn header_str<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<&'a str, IdentityHeaderError> {
    let value = headers
        .get(name)
        .ok_or(IdentityHeaderError::Missing(name))?;
    value
        .to_str()
        .map(str::trim)
        .map_err(|_| IdentityHeaderError::Malformed(name))
}

/// Compare API keys without leaking the matching prefix length through timing
pub fn constant_time_key_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Downstream guard: requires a gateway-established identity on every non-exempt path
#[derive(Clone)]
pub struct TrustedIdentityMiddleware {
    exempt: ExemptPaths,
    internal_api_key: Option<Arc<str>>,
}

impl TrustedIdentityMiddleware {
    /// `internal_api_key`, when set, must also arrive in `X-Internal-Api-Key`
    pub fn new(exempt: ExemptPaths, internal_api_key: Option<String>) -> Self {
        Self {
            exempt,
            internal_api_key: internal_api_key.map(Arc::from),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TrustedIdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = TrustedIdentityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TrustedIdentityMiddlewareService {
            service,
            exempt: self.exempt.clone(),
            internal_api_key: self.internal_api_key.clone(),
        }))
    }
}

pub struct TrustedIdentityMiddlewareService<S> {
    service: S,
    exempt: ExemptPaths,
    internal_api_key: Option<Arc<str>>,
}

impl<S, B> Service<ServiceRequest> for TrustedIdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.exempt.is_exempt(req.path()) {
            return self.forward(req);
        }

        if let Some(expected) = &self.internal_api_key {
            let provided = req
                .headers()
                .get(INTERNAL_API_KEY_HEADER)
                .and_then(|h| h.to_str().ok())
                .unwrap_or_default();

            if !constant_time_key_eq(provided, expected) {
                tracing::warn!(
                    path = %req.path(),
                    "Rejecting request without valid internal API key"
                );
                return reject(req);
            }
        }

        match TrustedIdentity::from_headers(req.headers()) {
            Ok(identity) => {
                tracing::debug!(
                    user_id = %identity.user_id,
                    role = %identity.role,
                    "Trusted identity attached"
                );
                req.extensions_mut().insert(identity);
                self.forward(req)
            }
            Err(e) => {
                tracing::warn!(path = %req.path(), error = %e, "Rejecting request without trusted identity");
                reject(req)
            }
        }
    }
}

impl<S, B> TrustedIdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    fn forward(
        &self,
        req: ServiceRequest,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Answer 401 in place so outer middleware still sees a response to decorate
fn reject<B: 'static>(
    req: ServiceRequest,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let res = req.error_response(ServiceError::Unauthorized);
    Box::pin(ready(Ok(res.map_into_right_body())))
}

/// FromRequest implementation for TrustedIdentity
impl FromRequest for TrustedIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<TrustedIdentity>() {
            Some(identity) => ready(Ok(identity.clone())),
            None => ready(Err(ServiceError::Unauthorized.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, web, App, HttpResponse};
    use actix_web::test as actix_test;

    async fn whoami(identity: TrustedIdentity) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}|{}|{}", identity.user_id, identity.email, identity.role))
    }

    async fn health() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    fn guard(key: Option<&str>) -> TrustedIdentityMiddleware {
        TrustedIdentityMiddleware::new(ExemptPaths::new(["/health"]), key.map(str::to_string))
    }

    fn identity_request(user_id: Uuid, role: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((USER_ID_HEADER, user_id.to_string()))
            .insert_header((USER_EMAIL_HEADER, "bob@x.com"))
            .insert_header((USER_ROLE_HEADER, role))
    }

    #[actix_web::test]
    async fn test_identity_headers_reach_handler() {
        let app = actix_test::init_service(
            App::new()
                .wrap(guard(None))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let user_id = Uuid::new_v4();
        let resp = actix_test::call_service(&app, identity_request(user_id, "EMPLOYER").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = actix_test::read_body(resp).await;
        assert_eq!(body, format!("{}|bob@x.com|EMPLOYER", user_id).as_bytes());
    }

    #[actix_web::test]
    async fn test_missing_identity_rejected() {
        let app = actix_test::init_service(
            App::new()
                .wrap(guard(None))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/whoami").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_malformed_identity_rejected() {
        let app = actix_test::init_service(
            App::new()
                .wrap(guard(None))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let bad_role = identity_request(Uuid::new_v4(), "SUPERUSER").to_request();
        let resp = actix_test::call_service(&app, bad_role).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let bad_id = actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((USER_ID_HEADER, "42"))
            .insert_header((USER_EMAIL_HEADER, "bob@x.com"))
            .insert_header((USER_ROLE_HEADER, "SEEKER"))
            .to_request();
        let resp = actix_test::call_service(&app, bad_id).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_internal_api_key_required_when_configured() {
        let app = actix_test::init_service(
            App::new()
                .wrap(guard(Some("internal-secret")))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let no_key = identity_request(Uuid::new_v4(), "SEEKER").to_request();
        let resp = actix_test::call_service(&app, no_key).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let wrong_key = identity_request(Uuid::new_v4(), "SEEKER")
            .insert_header((INTERNAL_API_KEY_HEADER, "internal-secreT"))
            .to_request();
        let resp = actix_test::call_service(&app, wrong_key).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let right_key = identity_request(Uuid::new_v4(), "SEEKER")
            .insert_header((INTERNAL_API_KEY_HEADER, "internal-secret"))
            .to_request();
        let resp = actix_test::call_service(&app, right_key).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_exempt_path_skips_guard() {
        let app = actix_test::init_service(
            App::new()
                .wrap(guard(Some("internal-secret")))
                .route("/health", web::get().to(health)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let app = actix_test::init_service(App::new().route("/whoami", web::get().to(whoami))).await;

        let req = identity_request(Uuid::new_v4(), "ADMIN").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_write_headers_round_trip() {
        let identity = TrustedIdentity::new(Uuid::new_v4(), "alice@x.com", Role::Seeker);
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(USER_ROLE_HEADER),
            HeaderValue::from_static("ADMIN"),
        );

        identity.write_headers(&mut headers).unwrap();
        assert_eq!(TrustedIdentity::from_headers(&headers).unwrap(), identity);
    }

    #[test]
    fn test_constant_time_key_eq() {
        assert!(constant_time_key_eq("abc", "abc"));
        assert!(!constant_time_key_eq("abc", "abd"));
        assert!(!constant_time_key_eq("ab", "abc"));
        assert!(!constant_time_key_eq("", "abc"));
    }
}
