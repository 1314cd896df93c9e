use crate::config::{VAULT_HOST_VAR, VAULT_TOKEN_VAR};
use crate::error::{ReplaceError, ReplaceResult};
use crate::traits::Environment;

/// Address and token used for every secret lookup of a run
#[derive(Clone, PartialEq, Eq)]
pub struct SecretStoreSession {
    pub host: String,
    pub token: String,
}

impl SecretStoreSession {
    /// Read both variables; either one missing or empty is fatal
    pub fn from_env(env: &dyn Environment) -> ReplaceResult<Self> {
        let host = required(env, VAULT_HOST_VAR)?;
        let token = required(env, VAULT_TOKEN_VAR)?;

        Ok(Self { host, token })
    }
}

// Keep the token out of debug logs
impl std::fmt::Debug for SecretStoreSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStoreSession")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn required(env: &dyn Environment, name: &str) -> ReplaceResult<String> {
    env.var(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ReplaceError::ConfigurationMissing(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockEnvironment;

    #[test]
    fn test_from_env() {
        let env = MockEnvironment::new()
            .with_var("VAULT_HOST", "https://vault.example.com")
            .with_var("VAULT_TOKEN", "s.token");

        let session = SecretStoreSession::from_env(&env).unwrap();
        assert_eq!(session.host, "https://vault.example.com");
        assert_eq!(session.token, "s.token");
    }

    #[test]
    fn test_missing_host() {
        let env = MockEnvironment::new().with_var("VAULT_TOKEN", "s.token");
        let err = SecretStoreSession::from_env(&env).unwrap_err();

        assert!(matches!(err, ReplaceError::ConfigurationMissing(ref var) if var == "VAULT_HOST"));
    }

    #[test]
    fn test_empty_token() {
        let env = MockEnvironment::new()
            .with_var("VAULT_HOST", "https://vault.example.com")
            .with_var("VAULT_TOKEN", "");
        let err = SecretStoreSession::from_env(&env).unwrap_err();

        assert!(matches!(err, ReplaceError::ConfigurationMissing(ref var) if var == "VAULT_TOKEN"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = SecretStoreSession {
            host: "https://vault.example.com".to_string(),
            token: "s.secret-token".to_string(),
        };

        let debug = format!("{:?}", session);
        assert!(!debug.contains("s.secret-token"));
        assert!(debug.contains("vault.example.com"));
    }
}
