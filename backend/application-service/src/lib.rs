//! Application Service
//!
//! Job applications. Ownership of the referenced job is resolved through a
//! [`JobDirectory`], so the service never trusts a job owner supplied by the
//! client.

pub mod config;
pub mod http;
pub mod jobs;
pub mod models;
pub mod service;
pub mod store;

pub use jobs::{HttpJobDirectory, InMemoryJobDirectory, JobDirectory};
pub use models::{Application, ApplicationStatus, ApplyRequest};
pub use service::ApplicationService;
pub use store::ApplicationStore;
