//! Credential provider behaviour over the in-memory store.

use std::cell::Cell;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};

use zdesk::error::{Result, ZdeskError};
use zdesk::identity::{
    CredentialAnswers, CredentialField, CredentialPrompter, CredentialProvider, IdentityStore,
    MemoryStore, SERVICE_NAME,
};

/// Prompter that answers from fixed values and counts how often it was used.
struct FixedPrompter {
    domain: &'static str,
    email: &'static str,
    api_key: &'static str,
    calls: Cell<usize>,
}

impl FixedPrompter {
    fn new(domain: &'static str, email: &'static str, api_key: &'static str) -> Self {
        Self {
            domain,
            email,
            api_key,
            calls: Cell::new(0),
        }
    }
}

impl CredentialPrompter for FixedPrompter {
    fn ask(&self, fields: &[CredentialField]) -> Result<CredentialAnswers> {
        self.calls.set(self.calls.get() + 1);
        let mut answers = CredentialAnswers::default();
        for field in fields {
            match field {
                CredentialField::Domain => answers.domain = Some(self.domain.to_string()),
                CredentialField::Email => answers.email = Some(self.email.to_string()),
                CredentialField::ApiKey => {
                    answers.api_key = Some(SecretString::from(self.api_key.to_string()))
                }
            }
        }
        Ok(answers)
    }
}

#[test]
fn capture_then_silent_resolve_round_trips() {
    let store = MemoryStore::new();
    let prompter = FixedPrompter::new("acme", "agent@acme.test", "k3y");
    let provider = CredentialProvider::new(&store, &prompter);

    provider.capture(None, None).unwrap();
    let calls_after_capture = prompter.calls.get();

    let identity = provider.resolve(true).unwrap();
    assert_eq!(identity.email, "agent@acme.test");
    assert_eq!(identity.domain, "acme");
    assert_eq!(identity.api_key.expose_secret(), "k3y");
    assert_eq!(prompter.calls.get(), calls_after_capture);
}

#[test]
fn stored_secret_is_packed_domain_and_key() {
    let store = MemoryStore::new();
    let prompter = FixedPrompter::new("acme", "agent@acme.test", "k3y");
    CredentialProvider::new(&store, &prompter)
        .capture(None, None)
        .unwrap();

    let stored = store.find_credentials(SERVICE_NAME).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].account, "agent@acme.test");
    assert_eq!(stored[0].password, "acme:k3y");
}

#[test]
fn logout_then_silent_resolve_fails() {
    let store = MemoryStore::new();
    let prompter = FixedPrompter::new("acme", "agent@acme.test", "k3y");
    let provider = CredentialProvider::new(&store, &prompter);

    provider.capture(None, None).unwrap();
    assert_eq!(
        provider.clear().unwrap().as_deref(),
        Some("agent@acme.test")
    );

    let err = provider.resolve(true).unwrap_err();
    assert!(matches!(err, ZdeskError::NotAuthenticated));
    assert!(store.is_empty());
}

#[test]
fn relogin_with_same_email_overwrites() {
    let store = MemoryStore::new();
    let first = FixedPrompter::new("acme", "agent@acme.test", "old");
    CredentialProvider::new(&store, &first)
        .capture(None, None)
        .unwrap();

    let second = FixedPrompter::new("acme", "agent@acme.test", "new");
    let provider = CredentialProvider::new(&store, &second);
    provider
        .capture(None, Some("agent@acme.test".to_string()))
        .unwrap();

    assert_eq!(store.len(), 1);
    let identity = provider.resolve(true).unwrap();
    assert_eq!(identity.api_key.expose_secret(), "new");
}

#[test]
fn non_silent_resolve_captures_once() {
    let store = MemoryStore::new();
    let prompter = FixedPrompter::new("acme", "agent@acme.test", "k3y");
    let provider = CredentialProvider::new(&store, &prompter);

    provider.resolve(false).unwrap();
    provider.resolve(false).unwrap();

    assert_eq!(prompter.calls.get(), 1);
}

#[test]
fn other_services_are_ignored() {
    let store = MemoryStore::new();
    store
        .set_password("some-other-cli", "agent@acme.test", "acme:k3y")
        .unwrap();
    let prompter = FixedPrompter::new("acme", "agent@acme.test", "k3y");
    let provider = CredentialProvider::new(&store, &prompter);

    assert!(matches!(
        provider.resolve(true),
        Err(ZdeskError::NotAuthenticated)
    ));
    assert_eq!(provider.clear().unwrap(), None);
    assert_eq!(store.len(), 1);
}
