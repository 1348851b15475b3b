#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use healthcare_api::config::AppConfig;
use healthcare_api::database::MemoryStore;
use healthcare_api::{app, AppState};

/// A running `healthcare-api` process; killed when dropped
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

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_healthcare-api"));
        cmd.env("HEALTHCARE_API_HOST", "127.0.0.1")
            .env("HEALTHCARE_API_PORT", port.to_string())
            .env("HEALTHCARE_STORE", "memory")
            .env("APP_ENV", "development")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&mut self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait()? {
                anyhow::bail!("server exited early with {}", status);
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start a dedicated server process for one test
pub async fn spawn_server() -> Result<TestServer> {
    let mut server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Router wired to a fresh in-memory store
pub fn test_app() -> Router {
    app(AppState::new(
        std::sync::Arc::new(MemoryStore::new()),
        AppConfig::development(),
    ))
}

/// Drive one request through the router, returning the status and JSON body
/// (`Value::Null` when the body is empty)
pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register and log in, returning the access token and the user's id
pub async fn sign_up(app: &Router, username: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register/",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "Str0ng!Pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login/",
        None,
        Some(json!({ "username": username, "password": "Str0ng!Pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    (body["data"]["access"].as_str().unwrap().to_string(), id)
}
