//! Map access credential and where it is kept.
//!
//! The credential is an injected value: views receive a [`CredentialStore`]
//! and read it once when the map surface is constructed. Submitting a new
//! token goes back through the same store.

mod schema;
mod sqlite;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

pub use sqlite::SqliteCredentialStore;

/// Fixed storage key for the map access token.
pub const CREDENTIAL_KEY: &str = "mapbox_token";

/// An opaque access token for the external map service.
///
/// `Debug` and `Display` never print the token itself, only a short fingerprint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Build a credential from user input.
    ///
    /// Surrounding whitespace is trimmed; blank input yields `None`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw token, for handing to the map widget.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short BLAKE3 fingerprint, safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let hash = blake3::hash(self.0.as_bytes()).to_hex();
        hash[..12].to_string()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.fingerprint()).finish()
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "token:{}", self.fingerprint())
    }
}

/// A stored credential and when it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// The token.
    pub credential: Credential,
    /// When the token was last saved.
    pub updated_at: DateTime<Utc>,
}

/// Persistent home of the map access token.
pub trait CredentialStore {
    /// Read the stored credential, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<StoredCredential>>;

    /// Replace the stored credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&mut self, credential: &Credential) -> Result<()>;

    /// Forget the stored credential. Returns whether one was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&mut self) -> Result<bool>;
}

/// Process-local credential store.
///
/// Clones share the same slot, so a test can hand one clone to a session and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<StoredCredential>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `credential`.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.slot.lock() {
            *slot = Some(StoredCredential {
                credential,
                updated_at: Utc::now(),
            });
        }
        store
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredCredential>>> {
        self.slot
            .lock()
            .map_err(|_| Error::internal("credential store lock poisoned"))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>> {
        Ok(self.slot()?.clone())
    }

    fn save(&mut self, credential: &Credential) -> Result<()> {
        *self.slot()? = Some(StoredCredential {
            credential: credential.clone(),
            updated_at: Utc::now(),
        });
        Ok(())
    }

    fn clear(&mut self) -> Result<bool> {
        Ok(self.slot()?.take().is_some())
    }
}
