//! API Gateway Middleware

pub mod auth;

pub use auth::{AuthFilter, FilterDecision, GatewayAuth, RejectReason};
