use chrono::{DateTime, Utc};
use crypto_core::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Stored credential - core identity entity
///
/// Never serialized; responses use [`UserView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Lower-cased and trimmed
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Public projection of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Canonical form used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::Seeker,
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(request("Bob", "bob@x.com", "pw").validate().is_ok());
        assert!(request("", "bob@x.com", "pw").validate().is_err());
        assert!(request("Bob", "not-an-email", "pw").validate().is_err());
        assert!(request("Bob", "bob@x.com", "").validate().is_err());
        assert!(request(&"n".repeat(101), "bob@x.com", "pw").validate().is_err());
        assert!(request("Bob", "bob@x.com", &"p".repeat(129)).validate().is_err());
    }

    #[test]
    fn test_register_request_accepts_jobseeker_alias() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Al","email":"al@x.com","password":"pw","role":"JOBSEEKER"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Role::Seeker);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Bob@X.com "), "bob@x.com");
    }

    #[test]
    fn test_user_view_has_no_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Bob".into(),
            email: "bob@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            role: Role::Employer,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&UserView::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
