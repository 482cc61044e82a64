//! Credential verification.
//!
//! Passwords are never stored: a user record holds the lowercase hex SHA-256
//! digest of the password, and login recomputes that digest and compares it
//! in constant time. Unknown usernames and wrong passwords produce the same
//! `false` result. Only an unreachable credential store is an error.
//!
//! Neither plaintext passwords nor digests are ever written to the log.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::error::CredentialError;

/// Hex-encoded SHA-256 digest of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Digest a plaintext password. Deterministic and one-way.
    #[must_use]
    pub fn compute(plaintext: &str) -> Self {
        Self(hex::encode(Sha256::digest(plaintext.as_bytes())))
    }

    /// Wrap a digest read back from a credential store.
    #[must_use]
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into().to_ascii_lowercase())
    }

    /// The hex form, as persisted.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time equality.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest([redacted])")
    }
}

/// Lookup and insert of user credential records.
///
/// Implementations must be safe to share across async tasks.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Fetch the stored digest for `username`.
    ///
    /// Returns `Ok(None)` if the user has no record.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Unavailable`] if the store cannot answer.
    async fn password_digest(
        &self,
        username: &str,
    ) -> Result<Option<PasswordDigest>, CredentialError>;

    /// Insert a new user record.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::UsernameTaken`] if a record already exists,
    /// [`CredentialError::Unavailable`] if the store cannot be written.
    async fn insert(&self, username: &str, digest: &PasswordDigest)
    -> Result<(), CredentialError>;
}

/// In-memory credential store for tests and database-less runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    users: Arc<RwLock<HashMap<String, PasswordDigest>>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn password_digest(
        &self,
        username: &str,
    ) -> Result<Option<PasswordDigest>, CredentialError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(
        &self,
        username: &str,
        digest: &PasswordDigest,
    ) -> Result<(), CredentialError> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(CredentialError::UsernameTaken {
                username: username.to_owned(),
            });
        }
        users.insert(username.to_owned(), digest.clone());
        Ok(())
    }
}

/// Reject an empty form field before it reaches the verifier.
///
/// # Errors
///
/// Returns [`CredentialError::EmptyField`] naming `field` if `value` is empty.
pub fn require_field(field: &'static str, value: &str) -> Result<(), CredentialError> {
    if value.is_empty() {
        return Err(CredentialError::EmptyField { field });
    }
    Ok(())
}

/// Verifies logins and registers new accounts against a [`CredentialStore`].
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Check `password` against the stored digest for `username`.
    ///
    /// Returns `Ok(false)` both for an unknown user and for a wrong password.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Unavailable`] if the store cannot be queried.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        // Digest first so unknown users cost the same as known ones.
        let presented = PasswordDigest::compute(password);

        let accepted = match self.store.password_digest(username).await? {
            Some(stored) => stored.matches(&presented),
            None => false,
        };

        tracing::debug!(username, accepted, "credential check");
        Ok(accepted)
    }

    /// Validate a signup form and store the new account.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::EmptyField`] if any field is empty.
    /// - [`CredentialError::PasswordMismatch`] if `confirm` differs from `password`.
    /// - [`CredentialError::UsernameTaken`] if the username already exists.
    /// - [`CredentialError::Unavailable`] if the store cannot be written.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), CredentialError> {
        require_field("username", username)?;
        require_field("password", password)?;
        require_field("passwordConfirm", confirm)?;

        if password.as_bytes().ct_eq(confirm.as_bytes()).unwrap_u8() == 0 {
            return Err(CredentialError::PasswordMismatch);
        }

        self.store
            .insert(username, &PasswordDigest::compute(password))
            .await?;

        tracing::info!(username, "account registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn verifier_with(users: &[(&str, &str)]) -> CredentialVerifier {
        let store = MemoryCredentialStore::new();
        for (name, password) in users {
            store
                .insert(name, &PasswordDigest::compute(password))
                .await
                .unwrap();
        }
        CredentialVerifier::new(Arc::new(store))
    }

    /// Store that is always down.
    struct DownStore;

    #[async_trait::async_trait]
    impl CredentialStore for DownStore {
        async fn password_digest(
            &self,
            _username: &str,
        ) -> Result<Option<PasswordDigest>, CredentialError> {
            Err(CredentialError::Unavailable {
                reason: "connection refused".to_owned(),
            })
        }

        async fn insert(
            &self,
            _username: &str,
            _digest: &PasswordDigest,
        ) -> Result<(), CredentialError> {
            Err(CredentialError::Unavailable {
                reason: "connection refused".to_owned(),
            })
        }
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            PasswordDigest::compute("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            PasswordDigest::compute("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_is_deterministic_and_not_plaintext() {
        let a = PasswordDigest::compute("secret");
        let b = PasswordDigest::compute("secret");
        assert!(a.matches(&b));
        assert_eq!(a.as_str().len(), 64);
        assert_ne!(a.as_str(), "secret");
    }

    #[test]
    fn stored_digest_case_is_normalized() {
        let computed = PasswordDigest::compute("abc");
        let stored = PasswordDigest::from_stored(computed.as_str().to_ascii_uppercase());
        assert!(stored.matches(&computed));
    }

    #[test]
    fn debug_output_is_redacted() {
        let digest = PasswordDigest::compute("secret");
        let shown = format!("{digest:?}");
        assert!(!shown.contains(digest.as_str()));
    }

    #[tokio::test]
    async fn verify_accepts_correct_password_only() {
        let verifier = verifier_with(&[("alice", "secret")]).await;

        assert!(verifier.verify("alice", "secret").await.unwrap());
        assert!(!verifier.verify("alice", "wrong").await.unwrap());
        assert!(!verifier.verify("alice", "").await.unwrap());
    }

    #[tokio::test]
    async fn verify_unknown_user_is_false() {
        let verifier = verifier_with(&[("alice", "secret")]).await;
        assert!(!verifier.verify("bob", "anything").await.unwrap());
    }

    #[tokio::test]
    async fn verify_propagates_store_outage() {
        let verifier = CredentialVerifier::new(Arc::new(DownStore));
        let result = verifier.verify("alice", "secret").await;
        assert!(matches!(result, Err(CredentialError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn register_then_verify() {
        let verifier = verifier_with(&[]).await;
        verifier.register("carol", "hunter2", "hunter2").await.unwrap();

        assert!(verifier.verify("carol", "hunter2").await.unwrap());
        assert!(!verifier.verify("carol", "hunter3").await.unwrap());
    }

    #[tokio::test]
    async fn register_rejects_bad_forms() {
        let verifier = verifier_with(&[("alice", "secret")]).await;

        assert!(matches!(
            verifier.register("", "pw", "pw").await,
            Err(CredentialError::EmptyField { field: "username" })
        ));
        assert!(matches!(
            verifier.register("dave", "", "").await,
            Err(CredentialError::EmptyField { field: "password" })
        ));
        assert!(matches!(
            verifier.register("dave", "pw", "").await,
            Err(CredentialError::EmptyField {
                field: "passwordConfirm"
            })
        ));
        assert!(matches!(
            verifier.register("dave", "pw", "pW").await,
            Err(CredentialError::PasswordMismatch)
        ));
        assert!(matches!(
            verifier.register("alice", "other", "other").await,
            Err(CredentialError::UsernameTaken { .. })
        ));

        // The failed duplicate signup must not have replaced the original digest.
        assert!(verifier.verify("alice", "secret").await.unwrap());
    }
}
