//! # Actix Middleware Library
//!
//! Middleware shared by the job portal Actix services
//!
//! ## Modules
//! - `trusted_identity`: trusted identity headers and the downstream guard middleware
//! - `guard`: per-operation role checks and ownership checks
//! - `exempt`: path prefixes that skip authentication
//! - `correlation_id`: `X-Correlation-ID` propagation
//! - `logging`: request logging

pub mod correlation_id;
pub mod exempt;
pub mod guard;
pub mod logging;
pub mod trusted_identity;

pub use correlation_id::{
    get_correlation_id, CorrelationId, CorrelationIdMiddleware, CORRELATION_ID_HEADER,
};
pub use exempt::{matches_prefix, ExemptPaths};
pub use guard::{authorize, require_owner, Operation, ANY_ROLE};
pub use logging::Logging;
pub use trusted_identity::{
    constant_time_key_eq, IdentityHeaderError, TrustedIdentity, TrustedIdentityMiddleware,
    GATEWAY_ONLY_HEADERS, INTERNAL_API_KEY_HEADER, USER_EMAIL_HEADER, USER_ID_HEADER,
    USER_ROLE_HEADER,
};
