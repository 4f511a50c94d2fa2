//! Hashing and verification of account secrets.
//!
//! Secrets are stored as Argon2id PHC strings, so the salt and the cost
//! parameters travel with the hash. Every call to [`CredentialStore::hash_secret`]
//! draws a fresh salt from the OS RNG.

use std::fmt;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{debug, trace, warn};

use crate::error::{AccountError, Result};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Owns the hasher used for both account kinds.
#[derive(Clone)]
pub struct CredentialStore {
    hasher: Argon2<'static>,
    cost: HashingCost,
    /// Verified against when the account does not exist, so an unknown email
    /// costs the same as a wrong password.
    decoy: String,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(cost: HashingCost) -> Result<Self> {
        debug!(?cost, "Building credential store");
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AccountError::Hashing(format!("Invalid hashing parameters: {}", e)))?;
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut store = Self {
            hasher,
            cost,
            decoy: String::new(),
        };
        store.decoy = store.hash_secret("decoy-credential-never-matches")?;
        Ok(store)
    }

    /// Hash a plaintext secret with a random salt.
    pub fn hash_secret(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Err(AccountError::EmptySecret);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AccountError::Hashing(e.to_string()))?
            .to_string();

        trace!("Secret hashed");
        Ok(hash)
    }

    /// Check a plaintext secret against a stored PHC string.
    ///
    /// The comparison is the primitive's constant-time one. A stored value
    /// that does not parse as a PHC string never verifies.
    pub fn verify_secret(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored credential is not a valid PHC string: {}", e);
                return false;
            }
        };

        self.hasher
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burn one verification against the decoy hash. Always false.
    pub(crate) fn verify_decoy(&self, plaintext: &str) -> bool {
        let _ = self.verify_secret(plaintext, &self.decoy);
        false
    }

    /// The pre-persist step for the `password` field.
    ///
    /// `stored` is the value currently persisted, `None` for a new record.
    /// Returns the hash to write, or `None` when `candidate` is exactly the
    /// stored value and must be left untouched.
    pub fn prepare_password(&self, candidate: &str, stored: Option<&str>) -> Result<Option<String>> {
        match stored {
            Some(stored) if stored == candidate => {
                trace!("Password unchanged, keeping stored hash");
                Ok(None)
            }
            _ => self.hash_secret(candidate).map(Some),
        }
    }

    /// Run Argon2 work on the blocking pool.
    async fn offload<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&CredentialStore) -> T + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || work(&store))
            .await
            .map_err(|e| AccountError::Hashing(format!("Hashing task failed: {}", e)))
    }

    /// [`Self::hash_secret`] off the async workers.
    pub async fn hash(&self, plaintext: &str) -> Result<String> {
        let plaintext = plaintext.to_owned();
        self.offload(move |store| store.hash_secret(&plaintext))
            .await?
    }

    /// [`Self::verify_secret`] off the async workers. A failed task verifies as false.
    pub async fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let (plaintext, hash) = (plaintext.to_owned(), hash.to_owned());
        match self
            .offload(move |store| store.verify_secret(&plaintext, &hash))
            .await
        {
            Ok(verified) => verified,
            Err(e) => {
                warn!("Verification did not complete: {}", e);
                false
            }
        }
    }

    /// Decoy verification off the async workers.
    pub(crate) async fn burn_decoy(&self, plaintext: &str) {
        let plaintext = plaintext.to_owned();
        let _ = self
            .offload(move |store| store.verify_decoy(&plaintext))
            .await;
    }

    /// [`Self::prepare_password`] off the async workers.
    pub async fn prepare(&self, candidate: &str, stored: Option<&str>) -> Result<Option<String>> {
        let candidate = candidate.to_owned();
        let stored = stored.map(str::to_owned);
        self.offload(move |store| store.prepare_password(&candidate, stored.as_deref()))
            .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fast_credentials;

    #[test]
    fn test_hash_then_verify() {
        let store = fast_credentials();
        let hash = store.hash_secret("secret1").unwrap();

        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2id$"));
        assert!(store.verify_secret("secret1", &hash));
    }

    #[test]
    fn test_wrong_secret_does_not_verify() {
        let store = fast_credentials();
        let hash = store.hash_secret("secret1").unwrap();

        assert!(!store.verify_secret("secret2", &hash));
        assert!(!store.verify_secret("", &hash));
        assert!(!store.verify_secret("Secret1", &hash));
    }

    #[test]
    fn test_hashing_is_salted() {
        let store = fast_credentials();
        let first = store.hash_secret("same input").unwrap();
        let second = store.hash_secret("same input").unwrap();

        assert_ne!(first, second);
        assert!(store.verify_secret("same input", &first));
        assert!(store.verify_secret("same input", &second));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let store = fast_credentials();
        assert!(matches!(store.hash_secret(""), Err(AccountError::EmptySecret)));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let store = fast_credentials();
        assert!(!store.verify_secret("secret1", "secret1"));
        assert!(!store.verify_secret("secret1", ""));
    }

    #[test]
    fn test_verification_uses_parameters_embedded_in_hash() {
        let cheap = fast_credentials();
        let other = CredentialStore::new(HashingCost {
            memory_kib: 512,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();

        let hash = cheap.hash_secret("portable").unwrap();
        assert!(other.verify_secret("portable", &hash));
    }

    #[test]
    fn test_prepare_password_for_new_record_hashes() {
        let store = fast_credentials();
        let hash = store.prepare_password("secret1", None).unwrap().unwrap();
        assert!(store.verify_secret("secret1", &hash));
    }

    #[test]
    fn test_prepare_password_skips_stored_hash() {
        let store = fast_credentials();
        let stored = store.hash_secret("secret1").unwrap();

        // Writing back the stored value must not produce a hash of the hash
        assert_eq!(store.prepare_password(&stored, Some(&stored)).unwrap(), None);
    }

    #[test]
    fn test_prepare_password_rehashes_changed_value() {
        let store = fast_credentials();
        let stored = store.hash_secret("secret1").unwrap();

        let new_hash = store
            .prepare_password("secret2", Some(&stored))
            .unwrap()
            .expect("changed password must be hashed");
        assert!(store.verify_secret("secret2", &new_hash));
        assert!(!store.verify_secret("secret1", &new_hash));
    }

    #[tokio::test]
    async fn test_blocking_pool_wrappers_match_inline_operations() {
        let store = fast_credentials();

        let hash = store.hash("secret1").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(store.verify("secret1", &hash).await);
        assert!(!store.verify("secret2", &hash).await);
        assert!(!store.verify("secret1", "not-a-phc-string").await);
        assert!(matches!(store.hash("").await, Err(AccountError::EmptySecret)));

        assert_eq!(store.prepare(&hash, Some(&hash)).await.unwrap(), None);
        let rehashed = store.prepare("secret2", Some(&hash)).await.unwrap().unwrap();
        assert!(store.verify_secret("secret2", &rehashed));
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        let result = CredentialStore::new(HashingCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(AccountError::Hashing(_))));
    }

    #[test]
    fn test_debug_does_not_expose_decoy() {
        let store = fast_credentials();
        let rendered = format!("{:?}", store);
        assert!(rendered.contains("CredentialStore"));
        assert!(!rendered.contains("$argon2id$"));
    }
}
