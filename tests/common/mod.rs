#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/quizdeck-api");
        cmd.env("QUIZDECK_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL and JWT_SECRET
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
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
                // Consider server ready on any liveness response
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
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// True when the spawned server has a working database behind it. Tests that
/// exercise persistent state skip themselves when this is false so the suite
/// stays green on machines without a configured DATABASE_URL.
pub async fn database_ready(server: &TestServer) -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        return false;
    }
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
    {
        Ok(resp) => resp.status() == StatusCode::OK,
        Err(_) => false,
    }
}

/// Unique suffix for usernames/emails so repeated runs do not collide.
pub fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos()
}

/// Register a fresh user and log in, returning (token, user json).
pub async fn register_and_login(
    client: &reqwest::Client,
    base_url: &str,
    prefix: &str,
) -> Result<(String, Value)> {
    let name = format!("{}{}", prefix, unique_suffix());
    let password = "correct-horse-9";

    let res = client
        .post(format!("{}/auth/register", base_url))
        .json(&json!({
            "username": name,
            "email": format!("{}@example.com", name),
            "password": password,
            "password2": password,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "register failed: {}",
        res.text().await?
    );

    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&json!({ "username": name, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "login failed: {}",
        res.text().await?
    );

    let body: Value = res.json().await?;
    let token = body["data"]["token"]
        .as_str()
        .context("missing token")?
        .to_string();
    let user = body["data"]["user"].clone();
    Ok((token, user))
}

/// Create a title owned by the token's user, returning its json.
pub async fn create_title(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
    status: &str,
) -> Result<Value> {
    let res = client
        .post(format!("{}/api/quiz/titles", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name, "description": "", "status": status }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "create title failed: {}",
        res.text().await?
    );
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

/// Create a question with the given choices, returning its json.
pub async fn create_question(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    title_id: &str,
    question_type: &str,
    choices: Value,
) -> Result<Value> {
    let res = client
        .post(format!("{}/api/quiz/questions", base_url))
        .bearer_auth(token)
        .json(&json!({
            "title_id": title_id,
            "text": "What is the right answer?",
            "explanation": "Explained after grading",
            "question_type": question_type,
            "position": 0,
            "choices": choices,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "create question failed: {}",
        res.text().await?
    );
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

/// Choice ids of a question json, split into (correct, incorrect).
pub fn split_choice_ids(question: &Value) -> (Vec<String>, Vec<String>) {
    let mut correct = vec![];
    let mut incorrect = vec![];
    for choice in question["choices"].as_array().cloned().unwrap_or_default() {
        let id = choice["id"].as_str().expect("choice id").to_string();
        if choice["is_correct"].as_bool().unwrap_or(false) {
            correct.push(id);
        } else {
            incorrect.push(id);
        }
    }
    (correct, incorrect)
}
