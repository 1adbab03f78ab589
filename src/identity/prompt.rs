//! Interactive credential capture.

use dialoguer::{Input, Password};
use secrecy::SecretString;

use crate::error::Result;

/// A credential field that may need to be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    /// Organization subdomain.
    Domain,
    /// Account email.
    Email,
    /// API token, always read masked.
    ApiKey,
}

impl CredentialField {
    /// Prompt text shown to the user.
    pub fn prompt(self) -> &'static str {
        match self {
            CredentialField::Domain => "Enter your Zendesk organization id (???.zendesk.com)",
            CredentialField::Email => "Enter your Zendesk email",
            CredentialField::ApiKey => "Enter your API key",
        }
    }
}

/// Values collected by a prompter. Fields that were not asked stay `None`.
#[derive(Debug, Default)]
pub struct CredentialAnswers {
    /// Organization subdomain.
    pub domain: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// API token.
    pub api_key: Option<SecretString>,
}

/// Source of credential values, normally the terminal.
pub trait CredentialPrompter {
    /// Asks for each field in order and returns the answers.
    fn ask(&self, fields: &[CredentialField]) -> Result<CredentialAnswers>;
}

/// Terminal prompter built on `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl CredentialPrompter for DialoguerPrompter {
    fn ask(&self, fields: &[CredentialField]) -> Result<CredentialAnswers> {
        let mut answers = CredentialAnswers::default();

        for &field in fields {
            match field {
                CredentialField::Domain => {
                    let value: String = Input::new().with_prompt(field.prompt()).interact_text()?;
                    answers.domain = Some(value.trim().to_string());
                }
                CredentialField::Email => {
                    let value: String = Input::new().with_prompt(field.prompt()).interact_text()?;
                    answers.email = Some(value.trim().to_string());
                }
                CredentialField::ApiKey => {
                    let value = Password::new().with_prompt(field.prompt()).interact()?;
                    answers.api_key = Some(SecretString::from(value.trim().to_string()));
                }
            }
        }

        Ok(answers)
    }
}
