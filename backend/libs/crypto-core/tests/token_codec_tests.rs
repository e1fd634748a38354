use chrono::{Duration, TimeZone, Utc};
use crypto_core::{Role, TokenCodec, VerifyError};
use uuid::Uuid;

const SHARED_SECRET: &str = "J8Kq2mPvRx4TnZs9YwLcGf7DhBe3Xa6W";

/// The verifier's own TTL has no bearing on tokens it checks
#[test]
fn test_verifier_ignores_its_own_ttl() {
    let issuer = TokenCodec::new(SHARED_SECRET, Duration::hours(1)).unwrap();
    let verifier = TokenCodec::new(SHARED_SECRET, Duration::seconds(1)).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

    let user = Uuid::new_v4();
    let token = issuer.issue(user, "bob@x.com", Role::Employer, now).unwrap();

    let later = now + Duration::minutes(30);
    let claims = verifier.verify(&token, later).unwrap();
    assert_eq!(claims.subject, user);
    assert_eq!(claims.role, Role::Employer);

    assert_eq!(
        verifier.verify(&token, now + Duration::hours(1)),
        Err(VerifyError::Expired)
    );
}

#[test]
fn test_verification_is_repeatable() {
    let codec = TokenCodec::new(SHARED_SECRET, Duration::hours(1)).unwrap();
    let now = Utc::now();
    let token = codec.issue(Uuid::new_v4(), "a@x.com", Role::Seeker, now).unwrap();

    let first = codec.verify(&token, now).unwrap();
    let second = codec.verify(&token, now).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_shared_codec_across_threads() {
    let codec = std::sync::Arc::new(TokenCodec::new(SHARED_SECRET, Duration::hours(1)).unwrap());
    let now = Utc::now();

    let handles: Vec<_> = Role::ALL
        .into_iter()
        .map(|role| {
            let codec = std::sync::Arc::clone(&codec);
            std::thread::spawn(move || {
                let token = codec.issue(Uuid::new_v4(), "t@x.com", role, now).unwrap();
                codec.verify(&token, now).unwrap().role
            })
        })
        .collect();

    let roles: Vec<Role> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(roles, Role::ALL.to_vec());
}
