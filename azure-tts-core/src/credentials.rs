//! API key lookup.
//!
//! The key is taken from the `--key` argument, then `AZURE_OPENAI_TTS_API_KEY`,
//! then the credential store entry named [`SERVICE_NAME`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use keyring::Entry;
use tracing::debug;

use crate::env::{Env, API_KEY_VAR};
use crate::error::{Result, TtsError};

/// Logical name the key is stored under.
pub const SERVICE_NAME: &str = "azure-tts";

// keyring entries need an account; there is only ever one key.
const ACCOUNT: &str = "api-key";

/// An API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

pub trait CredentialStore {
    fn get(&self, name: &str) -> Result<Option<String>>;
    fn set(&self, name: &str, value: &str) -> Result<()>;
}

/// OS keyring (Keychain, Credential Manager, kernel keyutils)
pub struct KeyringStore;

impl KeyringStore {
    fn entry(name: &str) -> Result<Entry> {
        Entry::new(name, ACCOUNT).map_err(|e| {
            TtsError::CredentialStore(format!("Failed to create keyring entry: {e}"))
        })
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        match Self::entry(name)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(TtsError::CredentialStore(e.to_string())),
        }
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        Self::entry(name)?
            .set_password(value)
            .map_err(|e| TtsError::CredentialStore(e.to_string()))
    }
}

/// In-process store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
        self
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| TtsError::CredentialStore(format!("Credential map poisoned: {e}")))
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.lock_entries()?.get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.lock_entries()?.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Resolve the key for this invocation. Fails with
/// [`TtsError::MissingCredential`] when no source has a non-empty value.
pub fn resolve_api_key(
    explicit: Option<&str>,
    env: &dyn Env,
    store: &dyn CredentialStore,
) -> Result<ApiKey> {
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        debug!("Using API key from --key");
        return Ok(ApiKey::new(key));
    }

    if let Some(key) = env.var(API_KEY_VAR) {
        debug!("Using API key from {API_KEY_VAR}");
        return Ok(ApiKey::new(key));
    }

    match store.get(SERVICE_NAME)? {
        Some(key) if !key.is_empty() => {
            debug!("Using API key from credential store");
            Ok(ApiKey::new(key))
        }
        _ => Err(TtsError::MissingCredential),
    }
}
