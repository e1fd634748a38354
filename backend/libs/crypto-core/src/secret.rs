//! Signing secret admission
//!
//! The identity service and the gateway share one HS256 secret. Both run
//! [`check_signing_secret`] while loading configuration, and
//! [`TokenCodec::new`](crate::TokenCodec::new) runs it again, so a secret that
//! one side would refuse can never be used to sign or verify.

use crate::jwt::TokenError;

/// 256 bits, the HS256 key size
pub const MIN_SECRET_LENGTH: usize = 32;

/// Fewer distinct bytes than this marks a placeholder such as `"a".repeat(32)`
const MIN_DISTINCT_BYTES: usize = 8;

/// Refuse secrets that are too short or built from a handful of repeated bytes
pub fn check_signing_secret(secret: &str) -> Result<(), TokenError> {
    let bytes = secret.as_bytes();
    if bytes.len() < MIN_SECRET_LENGTH {
        return Err(TokenError::WeakSecret);
    }

    let mut seen = [false; 256];
    let mut distinct = 0;
    for &byte in bytes {
        if !seen[byte as usize] {
            seen[byte as usize] = true;
            distinct += 1;
        }
    }
    if distinct < MIN_DISTINCT_BYTES {
        return Err(TokenError::WeakSecret);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_refused() {
        assert!(matches!(check_signing_secret("changeme"), Err(TokenError::WeakSecret)));
        assert!(matches!(
            check_signing_secret(&"J8Kq2mPv".repeat(4)[..31]),
            Err(TokenError::WeakSecret)
        ));
    }

    #[test]
    fn test_placeholder_secret_refused() {
        assert!(matches!(
            check_signing_secret(&"a".repeat(64)),
            Err(TokenError::WeakSecret)
        ));
        assert!(matches!(
            check_signing_secret(&"abc".repeat(20)),
            Err(TokenError::WeakSecret)
        ));
    }

    #[test]
    fn test_random_secret_admitted() {
        assert!(check_signing_secret("J8Kq2mPvRx4TnZs9YwLcGf7DhBe3Xa6W").is_ok());
        assert!(check_signing_secret(&"J8Kq2mPv".repeat(4)).is_ok());
    }
}
