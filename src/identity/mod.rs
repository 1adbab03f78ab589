//! Credential resolution.
//!
//! [`CredentialProvider`] looks up the stored identity, falls back to
//! interactive capture, and persists what it captures. The secret store and
//! the prompter are capabilities passed in, so the lookup/fallback/persist
//! logic runs without a keychain or a terminal in tests.
//!
//! The store is single-tenant: capturing a new identity removes whichever one
//! was stored before, and lookups use the first stored entry.

mod prompt;
mod store;

pub use prompt::{CredentialAnswers, CredentialField, CredentialPrompter, DialoguerPrompter};
pub use store::{
    pack_secret, unpack_secret, validate_api_key, validate_domain, IdentityStore, KeyringStore,
    MemoryStore, PlatformKeychain, SecretBackend, StoredCredential,
};

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, ZdeskError};

/// Secret store service name. Changing it orphans existing logins.
pub const SERVICE_NAME: &str = "zdesk-zendesk-cli";

/// Everything needed to authenticate against the API.
#[derive(Debug)]
pub struct Identity {
    /// Account email, used as the store account name.
    pub email: String,
    /// Organization subdomain, e.g. `acme` for acme.zendesk.com.
    pub domain: String,
    /// API token. SECURITY: never log this value!
    pub api_key: SecretString,
}

impl Identity {
    /// Builds an identity after validating every field.
    pub fn new(
        email: impl Into<String>,
        domain: impl Into<String>,
        api_key: SecretString,
    ) -> Result<Self> {
        let email = email.into().trim().to_string();
        let domain = domain.into().trim().to_string();

        if email.is_empty() || !email.contains('@') {
            return Err(ZdeskError::invalid_credential(
                "email must be a full address such as agent@example.com",
            ));
        }
        validate_domain(&domain)?;
        validate_api_key(&api_key)?;

        Ok(Self {
            email,
            domain,
            api_key,
        })
    }

    /// Rebuilds an identity from a store entry, with the same checks as [`Identity::new`].
    fn from_stored(stored: StoredCredential) -> Result<Self> {
        let (domain, api_key) = unpack_secret(&stored.password)?;
        Self::new(stored.account, domain, api_key)
    }

    /// Exposes the API key for request signing and error sanitization only.
    pub(crate) fn api_key_str(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Resolves, captures and clears the stored identity.
pub struct CredentialProvider<'a> {
    store: &'a dyn IdentityStore,
    prompter: &'a dyn CredentialPrompter,
}

impl<'a> CredentialProvider<'a> {
    /// Creates a provider over the given store and prompter.
    pub fn new(store: &'a dyn IdentityStore, prompter: &'a dyn CredentialPrompter) -> Self {
        Self { store, prompter }
    }

    /// Returns the stored identity, if any.
    pub fn stored(&self) -> Result<Option<Identity>> {
        self.store
            .find_credentials(SERVICE_NAME)?
            .into_iter()
            .next()
            .map(Identity::from_stored)
            .transpose()
    }

    /// Returns the stored identity, capturing one interactively when missing.
    ///
    /// # Errors
    ///
    /// Returns `ZdeskError::NotAuthenticated` when nothing is stored and
    /// `silent` is set.
    pub fn resolve(&self, silent: bool) -> Result<Identity> {
        if let Some(identity) = self.stored()? {
            tracing::debug!(email = %identity.email, domain = %identity.domain, "Using stored identity");
            return Ok(identity);
        }
        if silent {
            return Err(ZdeskError::NotAuthenticated);
        }
        self.capture(None, None)
    }

    /// Prompts for missing fields and replaces the stored identity.
    ///
    /// `domain` and `email` are only asked for when not supplied; the API key
    /// is always asked for.
    pub fn capture(&self, domain: Option<String>, email: Option<String>) -> Result<Identity> {
        let mut fields = Vec::with_capacity(3);
        if domain.is_none() {
            fields.push(CredentialField::Domain);
        }
        if email.is_none() {
            fields.push(CredentialField::Email);
        }
        fields.push(CredentialField::ApiKey);

        let answers = self.prompter.ask(&fields)?;

        let domain = domain
            .or(answers.domain)
            .ok_or_else(|| ZdeskError::invalid_credential("organization domain is required"))?;
        let email = email
            .or(answers.email)
            .ok_or_else(|| ZdeskError::invalid_credential("email is required"))?;
        let api_key = answers
            .api_key
            .ok_or_else(|| ZdeskError::invalid_credential("API key is required"))?;

        let identity = Identity::new(email, domain, api_key)?;
        let packed = pack_secret(&identity.domain, &identity.api_key)?;

        self.clear()?;
        self.store.delete_password(SERVICE_NAME, &identity.email)?;
        self.store.set_password(SERVICE_NAME, &identity.email, &packed)?;

        tracing::info!(email = %identity.email, domain = %identity.domain, "Stored identity");
        Ok(identity)
    }

    /// Removes the stored identity. Returns the email that was removed.
    pub fn clear(&self) -> Result<Option<String>> {
        let Some(current) = self.store.find_credentials(SERVICE_NAME)?.into_iter().next() else {
            return Ok(None);
        };
        self.store.delete_password(SERVICE_NAME, &current.account)?;
        tracing::debug!(email = %current.account, "Removed stored identity");
        Ok(Some(current.account))
    }
}
