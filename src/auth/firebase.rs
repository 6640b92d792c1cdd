use anyhow::Context;
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;

use super::jwks::{self, JwksVerifier};

/// Google publishes the securetoken signing keys as a plain JWK set at a
/// fixed location shared by every Firebase project.
const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// The slice of a Firebase service account file we care about. Private
/// key material in the file is never loaded; ID token verification only
/// needs the project id.
#[derive(Debug, Deserialize)]
struct ServiceAccount {
    project_id: String,
}

/// Build a Firebase ID token verifier from a service account file.
pub async fn from_service_account(path: &str) -> anyhow::Result<JwksVerifier> {
    let account = read_service_account(path)?;
    let set = jwks::fetch(SECURETOKEN_JWKS_URL).await?;

    JwksVerifier::from_keys(set, firebase_validation(&account.project_id))
}

fn read_service_account(path: &str) -> anyhow::Result<ServiceAccount> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read service account file {}", path))?;
    let account: ServiceAccount = serde_json::from_str(&raw)
        .with_context(|| format!("Service account file {} is not valid", path))?;

    if account.project_id.trim().is_empty() {
        anyhow::bail!("Service account file {} has an empty project_id", path);
    }

    Ok(account)
}

/// Firebase ID tokens pin both issuer and audience to the project.
fn firebase_validation(project_id: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[format!("https://securetoken.google.com/{}", project_id)]);
    validation.set_audience(&[project_id]);
    validation
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn temp_file(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("svc-account-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_project_id_from_service_account_file() {
        let path = temp_file(r#"{"type": "service_account", "project_id": "demo-project"}"#);
        let account = read_service_account(path.to_str().unwrap()).unwrap();
        assert_eq!(account.project_id, "demo-project");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_file_without_project_id() {
        let path = temp_file(r#"{"type": "service_account"}"#);
        assert!(read_service_account(path.to_str().unwrap()).is_err());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_missing_file() {
        assert!(read_service_account("/nonexistent/svc.json").is_err());
    }

    #[test]
    fn validation_pins_issuer_and_audience_to_project() {
        let validation = firebase_validation("demo-project");

        let issuers = validation.iss.unwrap();
        assert!(issuers.contains("https://securetoken.google.com/demo-project"));

        let audiences = validation.aud.unwrap();
        assert!(audiences.contains("demo-project"));
    }
}
