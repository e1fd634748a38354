//! Registration, login and lookup
//!
//! The only mutation is `register`, a single atomic insert. `login` reads the
//! credential and signs a token; it writes nothing.

use crate::db::UserRepository;
use crate::error::{IdentityError, Result};
use crate::models::user::normalize_email;
use crate::models::{LoginRequest, LoginResponse, NewUser, RegisterRequest, UserView};
use crate::security::{hash_password, verify_against_dummy, verify_password};
use chrono::{DateTime, Utc};
use crypto_core::TokenCodec;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    codec: Arc<TokenCodec>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>, codec: Arc<TokenCodec>) -> Self {
        Self { users, codec }
    }

    pub async fn register(&self, mut request: RegisterRequest) -> Result<UserView> {
        request.email = normalize_email(&request.email);
        request.name = request.name.trim().to_string();
        request.validate()?;

        let password_hash = hash_password(&request.password)?;
        let user = self
            .users
            .insert(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                role: request.role,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user.into())
    }

    /// Unknown email and wrong password are indistinguishable to the caller
    pub async fn login(&self, request: LoginRequest, now: DateTime<Utc>) -> Result<LoginResponse> {
        let email = normalize_email(&request.email);

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                verify_against_dummy(&request.password);
                debug!("Login failed: unknown account");
                return Err(IdentityError::InvalidCredentials);
            }
        };

        if !verify_password(&request.password, &user.password_hash)? {
            debug!(user_id = %user.id, "Login failed: password mismatch");
            return Err(IdentityError::InvalidCredentials);
        }

        let token = self.codec.issue(user.id, &user.email, user.role, now)?;
        info!(user_id = %user.id, "Token issued");

        Ok(LoginResponse {
            token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.codec.ttl().num_seconds(),
        })
    }

    pub async fn lookup(&self, id: Uuid) -> Result<UserView> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserView::from)
            .ok_or(IdentityError::UserNotFound)
    }

    pub async fn lookup_by_email(&self, email: &str) -> Result<UserView> {
        self.users
            .find_by_email(&normalize_email(email))
            .await?
            .map(UserView::from)
            .ok_or(IdentityError::UserNotFound)
    }
}
