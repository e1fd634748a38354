/// Credential storage for identity service
pub mod users;

pub use users::{InMemoryUserRepository, PgUserRepository, UserRepository};
