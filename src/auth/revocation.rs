use moka::Expiry;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

use crate::auth::jwt::now;

/// Keeps each revoked token id until the token itself would have expired.
struct UntilTokenExpiry;

impl Expiry<String, usize> for UntilTokenExpiry {
    fn expire_after_create(&self, _jti: &String, exp: &usize, _created_at: Instant) -> Option<Duration> {
        Some(Duration::from_secs(exp.saturating_sub(now()) as u64))
    }
}

/// jti => exp of access tokens invalidated by logout
static REVOKED_TOKENS: Lazy<Cache<String, usize>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .expire_after(UntilTokenExpiry)
        .build()
});

pub async fn revoke(jti: &str, exp: usize) {
    REVOKED_TOKENS.insert(jti.to_string(), exp).await;
}

pub async fn is_revoked(jti: &str) -> bool {
    REVOKED_TOKENS.get(jti).await.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_revoked_token_is_remembered() {
        revoke("revocation-test-a", now() + 600).await;
        assert!(is_revoked("revocation-test-a").await);
        assert!(!is_revoked("revocation-test-b").await);
    }
}
