use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_drapegear-api"));
        cmd.env("DRAPEGEAR_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL and token secrets
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
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
                // Ready on ok or degraded; degraded just means no database
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(60)).await?;
    Ok(server)
}

/// Database-backed tests are skipped when no DATABASE_URL is configured.
#[allow(dead_code)]
pub fn db_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Registers a fresh user and returns (email, access token).
#[allow(dead_code)]
pub async fn register_and_login(base_url: &str, role: &str) -> Result<(String, String)> {
    let client = reqwest::Client::new();
    let email = format!("{}-{}@test.drapegear.dev", role, uuid_suffix());

    let res = client
        .post(format!("{}/auth/register", base_url))
        .json(&serde_json::json!({
            "name": "Test User",
            "email": email,
            "password": "hunter22",
            "role": role,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&serde_json::json!({ "email": email, "password": "hunter22" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    let token = body["accessToken"]
        .as_str()
        .context("login response missing accessToken")?
        .to_string();
    Ok((email, token))
}

/// Unique suffix for emails/collections across test runs and threads.
#[allow(dead_code)]
pub fn uuid_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", std::process::id(), nanos, n)
}
