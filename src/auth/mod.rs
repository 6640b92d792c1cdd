pub mod firebase;
pub mod jwks;

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::VerifierConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token carries no subject")]
    MissingSubject,

    #[error("Token references unknown key id")]
    UnknownKeyId,

    #[error("Token verifier misconfigured: {0}")]
    Misconfigured(String),
}

/// The claims we actually read out of a verified token. Everything else
/// (audience, expiry, issuer) is checked by the jsonwebtoken validation
/// and never stored.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
}

/// Turns a bearer token into a stable user identifier. Handlers never see
/// tokens; they see the user id this trait produces.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

pub(crate) fn subject(claims: Claims) -> Result<String, AuthError> {
    match claims.sub {
        Some(sub) if !sub.is_empty() => Ok(sub),
        _ => Err(AuthError::MissingSubject),
    }
}

/// HS256 shared-secret verification for deployments that mint their own
/// tokens (local dev, CI, self-hosted installs).
pub struct HsVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl HsVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for HsVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            debug!("Rejected HS256 token: {}", err);
            AuthError::InvalidToken
        })?;

        subject(data.claims)
    }
}

#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    iat: usize,
    exp: usize,
}

/// Mint an HS256 token for the given subject. Used by the CLI and the
/// test suite; the server itself only ever verifies.
pub fn issue_hs256(
    secret: &str,
    sub: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = IssuedClaims {
        sub,
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Construct the verifier for the configured mode. JWKS-backed modes
/// fetch their key set here, once, so a bad issuer or unreachable key
/// endpoint fails startup instead of every request.
pub async fn build(config: &VerifierConfig) -> anyhow::Result<Arc<dyn TokenVerifier>> {
    let verifier: Arc<dyn TokenVerifier> = match config {
        VerifierConfig::HsSecret { secret } => {
            info!("Token verification mode: HS256 shared secret");
            Arc::new(HsVerifier::new(secret))
        }
        VerifierConfig::Jwks { issuer, jwks_url } => {
            let verifier =
                jwks::JwksVerifier::from_issuer(issuer.as_deref(), jwks_url.as_deref()).await?;
            info!(
                "Token verification mode: JWKS ({} signing keys)",
                verifier.key_count()
            );
            Arc::new(verifier)
        }
        VerifierConfig::Firebase {
            service_account_path,
        } => {
            let verifier = firebase::from_service_account(service_account_path).await?;
            info!("Token verification mode: Firebase ID tokens");
            Arc::new(verifier)
        }
    };

    Ok(verifier)
}
