use lazy_static::lazy_static;
use regex::Regex;

use crate::config::HashConfig;
use crate::users::password::{self, HashedPassword};

/// Minimum plaintext password length accepted on create and update.
pub const MIN_PASSWORD_LEN: usize = 4;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Argon2 is CPU-bound on purpose, so hashing runs off the async executor.
pub async fn hash_password(plain: String, cfg: HashConfig) -> anyhow::Result<HashedPassword> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain, &cfg)).await?
}

pub async fn verify_password(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("a@example.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[tokio::test]
    async fn blocking_hash_and_verify_roundtrip() {
        let cfg = HashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };
        let hash = hash_password("pass1".into(), cfg).await.expect("hash");
        assert!(verify_password("pass1".into(), hash.as_str().into())
            .await
            .expect("verify"));
        assert!(!verify_password("wrong".into(), hash.as_str().into())
            .await
            .expect("verify"));
    }
}
