//! Credential management for SteamBots API authentication.

use secrecy::{ExposeSecret, SecretString};

/// Environment variable read by [`EnvCredentials`].
pub const API_KEY_ENV_VAR: &str = "STEAMBOTS_API_KEY";

/// An API key for the SteamBots service.
#[derive(Clone)]
pub struct Credentials {
    api_key: SecretString,
}

impl Credentials {
    /// Create new credentials from an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Get the API key for a request.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Trait for providing API credentials.
///
/// Implement this trait to customize how the key is retrieved,
/// for example from a secrets manager.
pub trait CredentialsProvider: Send + Sync {
    /// Get the credentials.
    fn get_credentials(&self) -> &Credentials;
}

/// Static credentials provider that holds the key directly.
#[derive(Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Create a new static credentials provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(api_key),
        }
    }
}

impl CredentialsProvider for StaticCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl CredentialsProvider for Credentials {
    fn get_credentials(&self) -> &Credentials {
        self
    }
}

/// Credentials provider that reads the key from an environment variable.
///
/// By default, reads from `STEAMBOTS_API_KEY`.
pub struct EnvCredentials {
    credentials: Credentials,
}

impl EnvCredentials {
    /// Try to read the key from `STEAMBOTS_API_KEY`.
    ///
    /// Returns `None` if the variable is not set or empty.
    pub fn try_from_env() -> Option<Self> {
        Self::try_from_env_var(API_KEY_ENV_VAR)
    }

    /// Try to read the key from a custom environment variable.
    pub fn try_from_env_var(key_var: &str) -> Option<Self> {
        let api_key = std::env::var(key_var).ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        Some(Self {
            credentials: Credentials::new(api_key),
        })
    }
}

impl CredentialsProvider for EnvCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::new("super_secret_key");
        let debug_str = format!("{:?}", creds);
        assert!(!debug_str.contains("super_secret_key"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_static_credentials() {
        let provider = StaticCredentials::new("key");
        assert_eq!(provider.get_credentials().expose_key(), "key");
    }

    #[test]
    fn test_credentials_are_their_own_provider() {
        let provider: Box<dyn CredentialsProvider> = Box::new(Credentials::new("key"));
        assert_eq!(provider.get_credentials().expose_key(), "key");
    }

    #[test]
    fn test_env_credentials_missing_var() {
        assert!(EnvCredentials::try_from_env_var("STEAMBOTS_TEST_UNSET_VARIABLE").is_none());
    }
}
