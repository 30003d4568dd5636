//! The token mint (C4, spec §4.4): cryptographically random, collision-free
//! tokens.

use rand::Rng;

use crate::config_store::ConfigStore;
use crate::error::GatewayError;

const TOKEN_LEN: usize = 32;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const MAX_ATTEMPTS: usize = 8;

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Mint a fresh token, checked against `store` for collisions. Retries up
/// to `MAX_ATTEMPTS` times before failing `Exhausted`.
pub async fn mint(store: &ConfigStore) -> Result<String, GatewayError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_token();
        if !store.contains_token(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(GatewayError::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_expected_length_and_charset() {
        for _ in 0..50 {
            let token = random_token();
            assert_eq!(token.len(), TOKEN_LEN);
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[tokio::test]
    async fn mint_avoids_existing_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("webhooks.conf"), dir.path().join("backups"));
        let token = mint(&store).await.unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(!store.contains_token(&token).await.unwrap());
    }
}
