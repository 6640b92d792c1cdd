use std::env;

use thiserror::Error;

/// Application configuration, resolved once at startup and passed down
/// explicitly (no process-wide singleton).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database: DatabaseConfig,
    pub verifier: VerifierConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Token verification strategy. Exactly one mode is active per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierConfig {
    /// Shared-secret HS256 verification.
    HsSecret { secret: String },
    /// RS256 against a published key set. The JWKS URL defaults to the
    /// issuer's well-known endpoint when not given explicitly.
    Jwks {
        issuer: Option<String>,
        jwks_url: Option<String>,
    },
    /// Firebase ID tokens, verified against Google's securetoken keys.
    /// The path points at a service account JSON file carrying project_id.
    Firebase { service_account_path: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),

    #[error("No token verification mode configured; set FLASHCARD_SERVICE_ACCOUNT, FLASHCARD_JWT_SECRET, or FLASHCARD_JWT_ISSUER/FLASHCARD_JWKS_URL")]
    NoVerifierMode,

    #[error("Multiple token verification modes configured ({0}); exactly one must be active")]
    AmbiguousVerifierMode(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Keeps unit tests hermetic
    /// instead of mutating process-wide environment state.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match var("FLASHCARD_PORT").or_else(|| var("PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar("FLASHCARD_PORT", raw))?,
            None => 8000,
        };

        let url = var("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?;
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidVar("DATABASE_MAX_CONNECTIONS", raw))?,
            None => 5,
        };

        let verifier = Self::resolve_verifier(&var)?;

        Ok(Self {
            port,
            database: DatabaseConfig {
                url,
                max_connections,
            },
            verifier,
        })
    }

    fn resolve_verifier(
        var: &impl Fn(&str) -> Option<String>,
    ) -> Result<VerifierConfig, ConfigError> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let service_account = non_empty("FLASHCARD_SERVICE_ACCOUNT");
        let secret = non_empty("FLASHCARD_JWT_SECRET");
        let issuer = non_empty("FLASHCARD_JWT_ISSUER");
        let jwks_url = non_empty("FLASHCARD_JWKS_URL");

        let mut active = Vec::new();
        if service_account.is_some() {
            active.push("FLASHCARD_SERVICE_ACCOUNT");
        }
        if secret.is_some() {
            active.push("FLASHCARD_JWT_SECRET");
        }
        if issuer.is_some() || jwks_url.is_some() {
            active.push("FLASHCARD_JWT_ISSUER/FLASHCARD_JWKS_URL");
        }

        match active.len() {
            0 => Err(ConfigError::NoVerifierMode),
            1 => Ok(if let Some(path) = service_account {
                VerifierConfig::Firebase {
                    service_account_path: path,
                }
            } else if let Some(secret) = secret {
                VerifierConfig::HsSecret { secret }
            } else {
                VerifierConfig::Jwks { issuer, jwks_url }
            }),
            _ => Err(ConfigError::AmbiguousVerifierMode(active.join(", "))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_applied_with_minimal_env() {
        let config = AppConfig::from_vars(lookup(&[
            ("DATABASE_URL", "postgres://localhost/flashcards"),
            ("FLASHCARD_JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(
            config.verifier,
            VerifierConfig::HsSecret {
                secret: "s3cret".into()
            }
        );
    }

    #[test]
    fn port_falls_back_from_flashcard_port_to_port() {
        let config = AppConfig::from_vars(lookup(&[
            ("DATABASE_URL", "postgres://localhost/flashcards"),
            ("FLASHCARD_JWT_SECRET", "s3cret"),
            ("PORT", "9001"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9001);

        let config = AppConfig::from_vars(lookup(&[
            ("DATABASE_URL", "postgres://localhost/flashcards"),
            ("FLASHCARD_JWT_SECRET", "s3cret"),
            ("FLASHCARD_PORT", "9002"),
            ("PORT", "9001"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9002);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = AppConfig::from_vars(lookup(&[("FLASHCARD_JWT_SECRET", "s")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn verifier_mode_requires_exactly_one() {
        let err = AppConfig::from_vars(lookup(&[(
            "DATABASE_URL",
            "postgres://localhost/flashcards",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoVerifierMode));

        let err = AppConfig::from_vars(lookup(&[
            ("DATABASE_URL", "postgres://localhost/flashcards"),
            ("FLASHCARD_JWT_SECRET", "s"),
            ("FLASHCARD_SERVICE_ACCOUNT", "/etc/svc.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousVerifierMode(_)));
    }

    #[test]
    fn jwks_mode_from_issuer_alone() {
        let config = AppConfig::from_vars(lookup(&[
            ("DATABASE_URL", "postgres://localhost/flashcards"),
            ("FLASHCARD_JWT_ISSUER", "https://issuer.example.com"),
        ]))
        .unwrap();

        assert_eq!(
            config.verifier,
            VerifierConfig::Jwks {
                issuer: Some("https://issuer.example.com".into()),
                jwks_url: None,
            }
        );
    }

    #[test]
    fn blank_values_do_not_activate_a_mode() {
        let err = AppConfig::from_vars(lookup(&[
            ("DATABASE_URL", "postgres://localhost/flashcards"),
            ("FLASHCARD_JWT_SECRET", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoVerifierMode));
    }
}
