//! Per-operation authorization
//!
//! Each protected operation declares the roles allowed to invoke it as a
//! constant, next to the handler that implements it. Routing stays unaware of
//! roles.
//!
//! ```rust
//! use actix_middleware::{authorize, Operation, TrustedIdentity};
//! use crypto_core::Role;
//! use uuid::Uuid;
//!
//! const CREATE_JOB: Operation = Operation::new("create_job", &[Role::Employer]);
//!
//! let seeker = TrustedIdentity::new(Uuid::new_v4(), "a@x.com", Role::Seeker);
//! assert!(authorize(&seeker, &CREATE_JOB).is_err());
//! ```

use crypto_core::Role;
use error_types::ServiceError;
use uuid::Uuid;

use crate::trusted_identity::TrustedIdentity;

/// Every role; for operations open to any authenticated caller
pub const ANY_ROLE: &[Role] = &Role::ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub allowed_roles: &'static [Role],
}

impl Operation {
    pub const fn new(name: &'static str, allowed_roles: &'static [Role]) -> Self {
        Self {
            name,
            allowed_roles,
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

/// `Forbidden` unless the caller's role is in the operation's permission set
pub fn authorize(identity: &TrustedIdentity, operation: &Operation) -> Result<(), ServiceError> {
    if operation.permits(identity.role) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %identity.user_id,
        role = %identity.role,
        operation = operation.name,
        "Role not permitted for operation"
    );
    Err(ServiceError::Forbidden)
}

/// `Forbidden` unless the caller owns the resource
///
/// No role bypasses this check.
pub fn require_owner(identity: &TrustedIdentity, owner_id: Uuid) -> Result<(), ServiceError> {
    if identity.is_owner(&owner_id) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %identity.user_id,
        owner_id = %owner_id,
        "Caller does not own resource"
    );
    Err(ServiceError::Forbidden)
}
