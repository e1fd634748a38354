//! Token verification and identity injection for the API gateway
//!
//! [`AuthFilter`] is the pure decision: given a path, the `Authorization`
//! header and the current time it says whether to forward with an identity,
//! forward anonymously, or reject. [`GatewayAuth`] applies that decision to the
//! live request before the proxy sees it.

use actix_middleware::{
    ExemptPaths, TrustedIdentity, GATEWAY_ONLY_HEADERS, INTERNAL_API_KEY_HEADER,
};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue, AUTHORIZATION},
    Error, HttpMessage,
};
use chrono::{DateTime, Utc};
use crypto_core::TokenCodec;
use error_types::ServiceError;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::sync::Arc;

const BEARER_SCHEME: &str = "bearer";

/// Why a request was refused; the verification cause itself is only logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingCredentials,
    InvalidToken,
}

impl From<RejectReason> for ServiceError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::MissingCredentials => ServiceError::Unauthorized,
            RejectReason::InvalidToken => ServiceError::InvalidToken,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    ForwardWithIdentity(TrustedIdentity),
    ForwardWithoutIdentity,
    Reject(RejectReason),
}

#[derive(Debug, Clone)]
pub struct AuthFilter {
    codec: Arc<TokenCodec>,
    exempt: ExemptPaths,
}

impl AuthFilter {
    pub fn new(codec: Arc<TokenCodec>, exempt: ExemptPaths) -> Self {
        Self { codec, exempt }
    }

    pub fn evaluate(
        &self,
        path: &str,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> FilterDecision {
        if self.exempt.is_exempt(path) {
            return FilterDecision::ForwardWithoutIdentity;
        }

        let token = match authorization.and_then(bearer_token) {
            Some(token) => token,
            None => return FilterDecision::Reject(RejectReason::MissingCredentials),
        };

        match self.codec.verify(token, now) {
            Ok(claims) => FilterDecision::ForwardWithIdentity(TrustedIdentity::new(
                claims.subject,
                claims.email,
                claims.role,
            )),
            Err(cause) => {
                tracing::debug!(path = %path, cause = %cause, "Token verification failed");
                FilterDecision::Reject(RejectReason::InvalidToken)
            }
        }
    }
}

/// `Bearer <token>`: scheme case-insensitive, one space, non-empty token
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Gateway authentication middleware
#[derive(Clone)]
pub struct GatewayAuth {
    filter: Arc<AuthFilter>,
    internal_api_key: Option<HeaderValue>,
}

impl GatewayAuth {
    /// Fails only if `internal_api_key` is not a valid header value
    pub fn new(filter: AuthFilter, internal_api_key: Option<&str>) -> Result<Self, ServiceError> {
        let internal_api_key = internal_api_key
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|_| ServiceError::Internal("internal API key is not a valid header value".into()))?;

        Ok(Self {
            filter: Arc::new(filter),
            internal_api_key,
        })
    }
}

impl<S, B> Transform<S, ServiceRequest> for GatewayAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GatewayAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GatewayAuthService {
            service,
            filter: self.filter.clone(),
            internal_api_key: self.internal_api_key.clone(),
        }))
    }
}

pub struct GatewayAuthService<S> {
    service: S,
    filter: Arc<AuthFilter>,
    internal_api_key: Option<HeaderValue>,
}

impl<S, B> Service<ServiceRequest> for GatewayAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        // Only the gateway may assert identity
        for name in GATEWAY_ONLY_HEADERS {
            req.headers_mut().remove(name);
        }

        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);

        let decision = self
            .filter
            .evaluate(req.path(), authorization.as_deref(), Utc::now());

        match decision {
            FilterDecision::Reject(reason) => {
                tracing::info!(path = %req.path(), reason = ?reason, "Request rejected");
                return reject(req, reason.into());
            }
            FilterDecision::ForwardWithIdentity(identity) => {
                if let Err(e) = identity.write_headers(req.headers_mut()) {
                    tracing::warn!(error = %e, "Verified claims not representable as headers");
                    return reject(req, ServiceError::InvalidToken);
                }
                req.headers_mut().remove(AUTHORIZATION);
                req.extensions_mut().insert(identity);
            }
            FilterDecision::ForwardWithoutIdentity => {}
        }

        if let Some(key) = &self.internal_api_key {
            req.headers_mut()
                .insert(HeaderName::from_static(INTERNAL_API_KEY_HEADER), key.clone());
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

/// Rejections are rendered here so the correlation and logging layers still see them
fn reject<B: 'static>(
    req: ServiceRequest,
    error: ServiceError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let res = req.error_response(error);
    Box::pin(ready(Ok(res.map_into_right_body())))
}
