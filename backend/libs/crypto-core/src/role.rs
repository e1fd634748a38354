use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portal role carried in tokens and in the `X-User-Role` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[serde(alias = "JOBSEEKER")]
    Seeker,
    Employer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Seeker, Role::Employer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seeker => "SEEKER",
            Role::Employer => "EMPLOYER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Exact upper-case match only; header values are produced by the gateway.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SEEKER" | "JOBSEEKER" => Ok(Role::Seeker),
            "EMPLOYER" => Ok(Role::Employer),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
