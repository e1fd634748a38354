//! Job Service
//!
//! Job postings for the portal. Every route except `/health` sits behind the
//! trusted identity guard; callers are identified by the headers the gateway
//! writes, never by a token.

pub mod config;
pub mod http;
pub mod models;
pub mod store;

pub use models::{CreateJobRequest, Job};
pub use store::JobStore;
