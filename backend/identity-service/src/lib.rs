/// Identity Service Library
///
/// Owns credentials for the job portal: registration, login (token
/// issuance) and user lookup.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `db`: User repositories (in-memory, PostgreSQL)
/// - `error`: Error types
/// - `http`: Actix routes
/// - `models`: Data models and request DTOs
/// - `security`: Password hashing
/// - `services`: Business logic
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod security;
pub mod services;

// Re-export commonly used types
pub use error::{IdentityError, Result};
pub use services::IdentityService;
