/// Business logic for identity service
pub mod identity;

pub use identity::IdentityService;
