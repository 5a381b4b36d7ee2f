#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use family_ledger::app::app;
use family_ledger::config::AppConfig;
use family_ledger::state::{AppState, NoopHealth};
use family_ledger::testing::MemoryStore;
use reqwest::StatusCode;
use serde_json::{json, Value};

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    /// Serves the real router over an in-memory store on a free port. Each
    /// test gets its own server because each `#[tokio::test]` owns its runtime.
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;

        let store = MemoryStore::new();
        let state = AppState::new(config, store.clone(), Arc::new(NoopHealth));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            base_url,
            client: reqwest::Client::new(),
            store,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/ping")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.delete(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        Ok((res.status(), res.json().await?))
    }

    /// Registers and logs in; returns (token, user id)
    pub async fn signup(&self, username: &str, phone: &str) -> Result<(String, i64)> {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({ "username": username, "password": "secret1", "phone": phone }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {body}");

        let (status, body) = self
            .post("/auth/login", None, json!({ "phone": phone, "password": "secret1" }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {body}");

        let token = body["data"]["token"].as_str().context("missing token")?.to_string();
        let user_id = body["data"]["user"]["id"].as_i64().context("missing user id")?;
        Ok((token, user_id))
    }

    /// Creates a family and returns its id
    pub async fn create_family(&self, token: &str, name: &str, password: &str) -> Result<i64> {
        let (status, body) = self
            .post("/family/create", Some(token), json!({ "name": name, "password": password }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create family failed: {body}");
        body["data"]["id"].as_i64().context("missing family id")
    }

    pub async fn join(&self, token: &str, family_id: i64, user_id: i64, role: &str, password: &str) -> Result<(StatusCode, Value)> {
        self.post(
            "/family/join",
            Some(token),
            json!({ "family_id": family_id, "user_id": user_id, "role": role, "password": password }),
        )
        .await
    }
}

pub fn errno(body: &Value) -> i64 {
    body["errno"].as_i64().unwrap_or_default()
}
