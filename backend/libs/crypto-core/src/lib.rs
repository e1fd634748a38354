//! Shared cryptographic primitives for the job portal services
//!
//! - `jwt`: HS256 bearer token codec shared by the identity service and the gateway
//! - `role`: closed set of portal roles carried inside tokens
//! - `secret`: signing secret admission shared by the codec and config loading

pub mod jwt;
pub mod role;
pub mod secret;

pub use jwt::{TokenCodec, TokenError, VerifiedClaims, VerifyError};
pub use role::{Role, UnknownRole};
pub use secret::{check_signing_secret, MIN_SECRET_LENGTH};
