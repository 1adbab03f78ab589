//! Secret store capability and its implementations.
//!
//! The stored value is a packed `"{domain}:{api_key}"` string because the
//! platform keychains hold a single secret per entry. The domain is restricted
//! to `[A-Za-z0-9-]` and the API key may not contain `:`, so splitting on the
//! first `:` always recovers both parts.

use std::collections::BTreeMap;
use std::sync::Mutex;

use keyring::Entry;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, ZdeskError};

/// Separator between domain and API key in the packed secret.
const PACK_SEPARATOR: char = ':';

/// Keychain account holding the email of the active identity.
const ACTIVE_ACCOUNT_KEY: &str = "zdesk:active-account";

/// One account/secret pair read from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// Account name (the user's email).
    pub account: String,
    /// Packed secret value.
    pub password: String,
}

/// Account-keyed secret storage.
pub trait IdentityStore: Send + Sync {
    /// Returns every credential stored for `service`, active one first.
    fn find_credentials(&self, service: &str) -> Result<Vec<StoredCredential>>;

    /// Creates or overwrites the secret for `(service, account)`.
    fn set_password(&self, service: &str, account: &str, password: &str) -> Result<()>;

    /// Removes the secret for `(service, account)`. Returns false if none existed.
    fn delete_password(&self, service: &str, account: &str) -> Result<bool>;
}

/// Validates the domain and API key and packs them into one secret.
pub fn pack_secret(domain: &str, api_key: &SecretString) -> Result<String> {
    validate_domain(domain)?;
    validate_api_key(api_key)?;
    Ok(format!(
        "{}{}{}",
        domain,
        PACK_SEPARATOR,
        api_key.expose_secret()
    ))
}

/// Checks that an API key is non-empty and free of the pack separator.
pub fn validate_api_key(api_key: &SecretString) -> Result<()> {
    let key = api_key.expose_secret();
    if key.is_empty() {
        return Err(ZdeskError::invalid_credential("API key must not be empty"));
    }
    if key.contains(PACK_SEPARATOR) {
        return Err(ZdeskError::invalid_credential(format!(
            "API key must not contain '{}'",
            PACK_SEPARATOR
        )));
    }
    Ok(())
}

/// Splits a packed secret into domain and API key.
pub fn unpack_secret(packed: &str) -> Result<(String, SecretString)> {
    let (domain, key) = packed
        .split_once(PACK_SEPARATOR)
        .ok_or_else(|| ZdeskError::invalid_credential("stored secret is malformed"))?;
    if domain.is_empty() || key.is_empty() {
        return Err(ZdeskError::invalid_credential("stored secret is malformed"));
    }
    Ok((domain.to_string(), SecretString::from(key.to_string())))
}

/// Checks that a domain is a bare subdomain such as `acme`.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty()
        || !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ZdeskError::invalid_credential(format!(
            "organization domain must be the subdomain only (e.g. `acme` for acme.zendesk.com), got: {:?}",
            domain.chars().take(50).collect::<String>()
        )));
    }
    Ok(())
}

/// Raw per-entry secret access underneath [`KeyringStore`].
///
/// One secret per `(service, account)` pair, with no way to enumerate.
pub trait SecretBackend: Send + Sync {
    /// Reads the secret, or `None` when the entry does not exist.
    fn read(&self, service: &str, account: &str) -> Result<Option<String>>;

    /// Creates or overwrites the secret.
    fn write(&self, service: &str, account: &str, secret: &str) -> Result<()>;

    /// Removes the secret. Returns false if none existed.
    fn remove(&self, service: &str, account: &str) -> Result<bool>;
}

/// The platform keychain via `keyring`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformKeychain;

impl PlatformKeychain {
    fn entry(service: &str, account: &str) -> Result<Entry> {
        Ok(Entry::new(service, account)?)
    }
}

impl SecretBackend for PlatformKeychain {
    fn read(&self, service: &str, account: &str) -> Result<Option<String>> {
        match Self::entry(service, account)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, service: &str, account: &str, secret: &str) -> Result<()> {
        Ok(Self::entry(service, account)?.set_password(secret)?)
    }

    fn remove(&self, service: &str, account: &str) -> Result<bool> {
        match Self::entry(service, account)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Store backed by the platform keychain.
///
/// Keychains cannot list entries, so an extra entry under
/// [`ACTIVE_ACCOUNT_KEY`] records which account is logged in.
#[derive(Debug, Default, Clone)]
pub struct KeyringStore<B = PlatformKeychain> {
    backend: B,
}

impl KeyringStore {
    /// Creates a store over the platform keychain.
    pub fn new() -> Self {
        Self::with_backend(PlatformKeychain)
    }
}

impl<B: SecretBackend> KeyringStore<B> {
    /// Creates a store over any per-entry backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SecretBackend> IdentityStore for KeyringStore<B> {
    fn find_credentials(&self, service: &str) -> Result<Vec<StoredCredential>> {
        // Follow the index; there is nothing else to enumerate
        let Some(account) = self.backend.read(service, ACTIVE_ACCOUNT_KEY)? else {
            return Ok(Vec::new());
        };

        match self.backend.read(service, &account)? {
            Some(password) => Ok(vec![StoredCredential { account, password }]),
            None => {
                tracing::debug!("Active account index points at a missing entry");
                Ok(Vec::new())
            }
        }
    }

    fn set_password(&self, service: &str, account: &str, password: &str) -> Result<()> {
        self.backend.write(service, account, password)?;
        self.backend.write(service, ACTIVE_ACCOUNT_KEY, account)?;
        Ok(())
    }

    fn delete_password(&self, service: &str, account: &str) -> Result<bool> {
        let existed = self.backend.remove(service, account)?;
        // Only drop the index if it names the account just removed
        if self.backend.read(service, ACTIVE_ACCOUNT_KEY)?.as_deref() == Some(account) {
            self.backend.remove(service, ACTIVE_ACCOUNT_KEY)?;
        }
        Ok(existed)
    }
}

/// In-memory store, ordered by service then account.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<(String, String), String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets across all services.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), String>> {
        // A poisoned map is still consistent: every mutation is a single insert/remove.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IdentityStore for MemoryStore {
    fn find_credentials(&self, service: &str) -> Result<Vec<StoredCredential>> {
        Ok(self
            .lock()
            .iter()
            .filter(|((s, _), _)| s.as_str() == service)
            .map(|((_, account), password)| StoredCredential {
                account: account.clone(),
                password: password.clone(),
            })
            .collect())
    }

    fn set_password(&self, service: &str, account: &str, password: &str) -> Result<()> {
        self.lock()
            .insert((service.to_string(), account.to_string()), password.to_string());
        Ok(())
    }

    fn delete_password(&self, service: &str, account: &str) -> Result<bool> {
        Ok(self
            .lock()
            .remove(&(service.to_string(), account.to_string()))
            .is_some())
    }
}

impl SecretBackend for MemoryStore {
    fn read(&self, service: &str, account: &str) -> Result<Option<String>> {
        Ok(self
            .lock()
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn write(&self, service: &str, account: &str, secret: &str) -> Result<()> {
        self.set_password(service, account, secret)
    }

    fn remove(&self, service: &str, account: &str) -> Result<bool> {
        self.delete_password(service, account)
    }
}
