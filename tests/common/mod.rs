use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Secret the spawned server verifies tokens against. Tests mint their
/// own tokens with it.
pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub base_url: String,
    _child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds and points us at the server binary. The child
        // inherits the environment (and loads .env itself) so it can see
        // DATABASE_URL; the verifier mode is forced to the shared secret
        // regardless of what the host environment configures.
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_flashcard-api"));
        cmd.env("FLASHCARD_PORT", port.to_string())
            .env("FLASHCARD_JWT_SECRET", TEST_SECRET)
            .env_remove("FLASHCARD_SERVICE_ACCOUNT")
            .env_remove("FLASHCARD_JWT_ISSUER")
            .env_remove("FLASHCARD_JWKS_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            base_url,
            _child: child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server =
        SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Fresh user id per test. Every row is scoped by owner, so distinct
/// users keep concurrently running tests from seeing each other's data.
pub fn unique_user() -> String {
    format!("user-{}", uuid::Uuid::new_v4().simple())
}

pub fn token_for(user_id: &str) -> String {
    flashcard_api::auth::issue_hs256(TEST_SECRET, user_id, 1).expect("failed to mint test token")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
