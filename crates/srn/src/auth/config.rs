//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Minimum accepted length for the HS256 shared secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HS256 secret used by the identity provider to sign tokens.
    /// Either a literal value or `env:VAR_NAME` (e.g. `env:SUPABASE_JWT_SECRET`).
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    /// Returns the resolved secret or None if not configured.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Resolve and validate the secret. A server must not start without one.
    pub fn require_jwt_secret(&self) -> Result<String, ConfigValidationError> {
        let secret = self
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::JwtSecretTooShort);
        }

        Ok(secret)
    }

    /// Generate a random secret, suitable for local development setups.
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// No JWT secret configured.
    MissingJwtSecret,
    /// JWT secret is too short.
    JwtSecretTooShort,
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingJwtSecret => write!(
                f,
                "JWT secret is required. Set SRN__AUTH__JWT_SECRET or auth.jwt_secret in config."
            ),
            Self::JwtSecretTooShort => write!(
                f,
                "JWT secret must be at least {MIN_SECRET_LEN} characters long."
            ),
            Self::EnvVarNotFound(var) => write!(
                f,
                "Environment variable '{var}' not found (referenced via env:{var} in config)."
            ),
            Self::EnvVarEmpty(var) => write!(
                f,
                "Environment variable '{var}' is empty (referenced via env:{var} in config)."
            ),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: Some(secret.to_string()),
        }
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let config = AuthConfig::default();
        assert_eq!(
            config.require_jwt_secret().unwrap_err(),
            ConfigValidationError::MissingJwtSecret
        );
    }

    #[test]
    fn test_short_secret_rejected() {
        assert_eq!(
            with_secret("tooshort").require_jwt_secret().unwrap_err(),
            ConfigValidationError::JwtSecretTooShort
        );
    }

    #[test]
    fn test_literal_secret_accepted() {
        let secret = "a-very-long-and-secure-jwt-secret-that-is-at-least-32-chars";
        assert_eq!(with_secret(secret).require_jwt_secret().unwrap(), secret);
    }

    #[test]
    fn test_resolve_jwt_secret_env_var() {
        // SAFETY: test-only variable with a unique name
        unsafe {
            std::env::set_var("SRN_TEST_JWT_SECRET_81723", "secret-from-env-var-at-least-32-chars");
        }

        let resolved = with_secret("env:SRN_TEST_JWT_SECRET_81723")
            .resolve_jwt_secret()
            .unwrap();
        assert_eq!(
            resolved,
            Some("secret-from-env-var-at-least-32-chars".to_string())
        );

        // SAFETY: cleaning up the variable set above
        unsafe {
            std::env::remove_var("SRN_TEST_JWT_SECRET_81723");
        }
    }

    #[test]
    fn test_resolve_jwt_secret_env_var_not_found() {
        let result = with_secret("env:SRN_NONEXISTENT_VAR_81723").resolve_jwt_secret();
        assert_eq!(
            result.unwrap_err(),
            ConfigValidationError::EnvVarNotFound("SRN_NONEXISTENT_VAR_81723".to_string())
        );
    }

    #[test]
    fn test_generated_secret_passes_validation() {
        let secret = AuthConfig::generate_jwt_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(with_secret(&secret).require_jwt_secret().is_ok());
    }
}
