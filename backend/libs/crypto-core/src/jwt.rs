//! Bearer token codec shared by the identity service and the API gateway
//!
//! Tokens are HS256 JWTs signed with a symmetric secret that only the identity
//! service (issuer) and the gateway (verifier) hold. Downstream services never
//! see the token or the secret; they receive the verified claims as headers.
//!
//! ## Security Design
//!
//! - **HS256 ONLY**: tokens declaring any other algorithm are rejected
//! - **Explicit clock**: `issue` and `verify` take `now`, no hidden time source
//! - **No leeway**: a token is expired as soon as `now >= exp`
//! - **Immutable**: keys are fixed at construction; share the codec behind an `Arc`
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use crypto_core::{Role, TokenCodec};
//! use uuid::Uuid;
//!
//! let codec = TokenCodec::new("J8Kq2mPvRx4TnZs9YwLcGf7DhBe3Xa6W", Duration::hours(1)).unwrap();
//! let now = Utc::now();
//! let token = codec.issue(Uuid::new_v4(), "bob@x.com", Role::Employer, now).unwrap();
//! let claims = codec.verify(&token, now).unwrap();
//! assert_eq!(claims.role, Role::Employer);
//! ```

use crate::role::Role;
use crate::secret::{check_signing_secret, MIN_SECRET_LENGTH};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// JWT algorithm - MUST be HS256 for the shared-secret scheme
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Wire claims
#[derive(Debug, Serialize, Deserialize, Clone)]
struct Claims {
    /// Subject (user ID as UUID string)
    sub: String,
    email: String,
    role: Role,
    /// Issued at (Unix timestamp)
    iat: i64,
    /// Expiration time (Unix timestamp)
    exp: i64,
}

/// Claims of a token whose signature and expiry have been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: Uuid,
    pub email: String,
    pub role: Role,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Construction and issuance failures (configuration problems, not attacker input)
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret must be at least {MIN_SECRET_LENGTH} bytes of varied content")]
    WeakSecret,

    #[error("token TTL must be positive")]
    InvalidTtl,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Why a token was refused
///
/// Kept distinct for logging only. The gateway answers every variant with the
/// same generic 401 so clients cannot tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed token")]
    Malformed,

    #[error("signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &JWT_ALGORITHM)
            .field("ttl_seconds", &self.ttl.num_seconds())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from the shared secret and token lifetime
    ///
    /// ## Errors
    ///
    /// - `WeakSecret` if [`check_signing_secret`] refuses the secret
    /// - `InvalidTtl` if `ttl` is zero or negative
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        check_signing_secret(secret)?;
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidTtl);
        }

        // Expiry is checked against the caller's clock in `verify`
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token with `iat = now` and `exp = now + ttl`
    pub fn issue(
        &self,
        subject: Uuid,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let issued_at = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            role,
            iat: issued_at,
            exp: issued_at + self.ttl.num_seconds(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Check signature, structure and expiry of `token` at time `now`
    ///
    /// Attacker-controlled input never panics; every failure is a `VerifyError`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedClaims, VerifyError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerifyError::BadSignature
                }
                _ => VerifyError::Malformed,
            }
        })?;

        let claims = data.claims;
        if now.timestamp() >= claims.exp {
            return Err(VerifyError::Expired);
        }

        let subject = Uuid::parse_str(&claims.sub).map_err(|_| VerifyError::Malformed)?;

        Ok(VerifiedClaims {
            subject,
            email: claims.email,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::TimeZone;

    const TEST_SECRET: &str = "J8Kq2mPvRx4TnZs9YwLcGf7DhBe3Xa6W";

    fn codec() -> TokenCodec {
        TokenCodec::new(TEST_SECRET, Duration::seconds(3600)).expect("valid codec")
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let now = fixed_now();

        let token = codec
            .issue(user_id, "bob@x.com", Role::Employer, now)
            .expect("issue");
        assert_eq!(token.matches('.').count(), 2);

        let claims = codec.verify(&token, now).expect("verify");
        assert_eq!(claims.subject, user_id);
        assert_eq!(claims.email, "bob@x.com");
        assert_eq!(claims.role, Role::Employer);
        assert_eq!(claims.issued_at, now.timestamp());
        assert_eq!(claims.expires_at, now.timestamp() + 3600);
    }

    #[test]
    fn test_valid_until_just_before_expiry() {
        let codec = codec();
        let now = fixed_now();
        let token = codec
            .issue(Uuid::new_v4(), "a@x.com", Role::Seeker, now)
            .unwrap();

        let almost = now + Duration::seconds(3599);
        assert!(codec.verify(&token, almost).is_ok());
    }

    #[test]
    fn test_expired_at_and_after_exp() {
        let codec = codec();
        let now = fixed_now();
        let token = codec
            .issue(Uuid::new_v4(), "a@x.com", Role::Seeker, now)
            .unwrap();

        let at_exp = now + Duration::seconds(3600);
        assert_eq!(codec.verify(&token, at_exp), Err(VerifyError::Expired));

        let later = now + Duration::days(2);
        assert_eq!(codec.verify(&token, later), Err(VerifyError::Expired));
    }

    #[test]
    fn test_issue_is_deterministic() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let now = fixed_now();

        let a = codec.issue(user_id, "a@x.com", Role::Admin, now).unwrap();
        let b = codec.issue(user_id, "a@x.com", Role::Admin, now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_bit_signature_tamper_rejected() {
        let codec = codec();
        let now = fixed_now();
        let token = codec
            .issue(Uuid::new_v4(), "a@x.com", Role::Seeker, now)
            .unwrap();

        let (signed, signature) = token.rsplit_once('.').unwrap();
        let sig_bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for byte in 0..sig_bytes.len() {
            for bit in 0..8 {
                let mut tampered_sig = sig_bytes.clone();
                tampered_sig[byte] ^= 1 << bit;
                let tampered = format!("{}.{}", signed, URL_SAFE_NO_PAD.encode(&tampered_sig));
                assert_eq!(
                    codec.verify(&tampered, now),
                    Err(VerifyError::BadSignature),
                    "byte {byte} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = fixed_now();
        let token = codec()
            .issue(Uuid::new_v4(), "a@x.com", Role::Seeker, now)
            .unwrap();

        let other = TokenCodec::new("Zq7WmK2pXv9RtN4sLc8YgF3dHb6JeA5w", Duration::hours(1)).unwrap();
        assert_eq!(other.verify(&token, now), Err(VerifyError::BadSignature));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = codec();
        let now = fixed_now();

        for garbage in ["", "invalid.token.here", "not-a-jwt", "a.b", "....", "Bearer x"] {
            assert!(codec.verify(garbage, now).is_err(), "{garbage:?}");
        }
    }

    #[test]
    fn test_foreign_algorithm_rejected() {
        let now = fixed_now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@x.com".to_string(),
            role: Role::Admin,
            iat: now.timestamp(),
            exp: now.timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec().verify(&token, now), Err(VerifyError::BadSignature));
    }

    #[test]
    fn test_non_uuid_subject_is_malformed() {
        let now = fixed_now();
        let claims = Claims {
            sub: "42".to_string(),
            email: "a@x.com".to_string(),
            role: Role::Seeker,
            iat: now.timestamp(),
            exp: now.timestamp() + 60,
        };
        let token = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec().verify(&token, now), Err(VerifyError::Malformed));
    }

    #[test]
    fn test_short_secret_refused() {
        let result = TokenCodec::new("too-short", Duration::hours(1));
        assert!(matches!(result, Err(TokenError::WeakSecret)));

        let result = TokenCodec::new(&"ab".repeat(32), Duration::hours(1));
        assert!(matches!(result, Err(TokenError::WeakSecret)));
    }

    #[test]
    fn test_non_positive_ttl_refused() {
        let result = TokenCodec::new(TEST_SECRET, Duration::zero());
        assert!(matches!(result, Err(TokenError::InvalidTtl)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", codec());
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains(TEST_SECRET));
    }
}
