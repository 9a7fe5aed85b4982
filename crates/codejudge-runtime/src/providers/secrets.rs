//! Credential handling for remote judge providers.
//!
//! Credentials are wrapped in [`ApiCredential`] as soon as they are read:
//!
//! - **No accidental logging**: `Debug`/`Display` print `[REDACTED]`
//! - **Memory hygiene**: the value is zeroed on drop via `secrecy`
//! - **Explicit exposure**: `.expose()` is called only when building a header
//!
//! ## Usage
//!
//! ```ignore
//! let lookup = |k: &str| std::env::var(k).ok();
//! let cred = ApiCredential::from_lookup(lookup, "OPENAI_API_KEY", "OpenAI API key");
//! if let Some(cred) = cred {
//!     request.header("authorization", format!("Bearer {}", cred.expose()));
//! }
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable (or any key/value lookup)
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a credential value. It cannot be logged after this point.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Resolve a credential through a key/value lookup.
    ///
    /// Returns `None` when the key is unset or blank; a blank key is treated
    /// as absent so the offline fallback still applies.
    pub fn from_lookup<F>(lookup: F, env_var: &str, name: &'static str) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(env_var)
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self::new(v, CredentialSource::Environment, name))
    }

    /// Expose the credential value for use in an API call.
    ///
    /// Only call this where the value is needed (an HTTP header). Never store it.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_credential_redacted_in_debug() {
        let secret = "sk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, CredentialSource::Programmatic, "Test API key");

        let debug = format!("{:?}", cred);
        assert!(!debug.contains(secret), "Secret exposed in Debug!");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_credential_redacted_in_display() {
        let secret = "sk-super-secret-key-12345";
        let cred = ApiCredential::new(secret, CredentialSource::Environment, "Test API key");

        let display = format!("{}", cred);
        assert!(!display.contains(secret), "Secret exposed in Display!");
        assert!(display.contains("[REDACTED]"));
        assert!(display.contains("Test API key"));
        assert!(display.contains("environment"));
    }

    #[test]
    fn test_credential_expose() {
        let cred = ApiCredential::new("sk-abc", CredentialSource::Programmatic, "Test");
        assert_eq!(cred.expose(), "sk-abc");
        assert!(!cred.is_empty());
        assert_eq!(cred.name(), "Test");
    }

    #[test]
    fn test_from_lookup_present() {
        let vars: HashMap<&str, &str> = [("MY_KEY", "value-1")].into_iter().collect();
        let lookup = |k: &str| vars.get(k).map(|v| v.to_string());
        let cred = ApiCredential::from_lookup(lookup, "MY_KEY", "Key").unwrap();
        assert_eq!(cred.expose(), "value-1");
        assert_eq!(cred.source(), CredentialSource::Environment);
    }

    #[test]
    fn test_from_lookup_absent_or_blank() {
        assert!(ApiCredential::from_lookup(|_| None, "MY_KEY", "Key").is_none());

        let blank = |_: &str| Some("   ".to_string());
        assert!(ApiCredential::from_lookup(blank, "MY_KEY", "Key").is_none());
    }
}
