#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};

use portfolio_api::auth::TokenService;
use portfolio_api::config::AppConfig;
use portfolio_api::database::{DocumentStore, MemoryStore};
use portfolio_api::filter::Filter;
use portfolio_api::mail::{MailError, Mailer};
use portfolio_api::AppState;

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "owner@portfolio.test";
pub const ADMIN_PASSWORD: &str = "owner-password";

/// Captures outgoing mail; can be switched to fail every send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: Mutex<bool>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next_sends(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, subject: &str, html_body: &str) -> Result<(), MailError> {
        if *self.fail.lock().unwrap() {
            return Err(MailError::Rejected(reqwest::StatusCode::BAD_GATEWAY));
        }
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), html_body.to_string()));
        Ok(())
    }
}

/// In-process server on a free port, backed by a fresh `MemoryStore`.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub tokens: TokenService,
    pub client: reqwest::Client,
}

pub fn test_config() -> Result<AppConfig> {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("STORE_BACKEND", "memory"),
        ("SECRET_KEY", SECRET),
        ("EMAIL", ADMIN_EMAIL),
        ("PASSWORD", ADMIN_PASSWORD),
        ("STORE_TIMEOUT_SECS", "5"),
    ]);
    Ok(AppConfig::from_source(|key| vars.get(key).map(|v| v.to_string()))?)
}

pub async fn spawn() -> Result<TestServer> {
    let config = test_config()?;
    let tokens = TokenService::new(SECRET, config.security.jwt_expiry_hours)?;
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());

    let state = AppState::new(
        config,
        tokens.clone(),
        store.clone() as Arc<dyn DocumentStore>,
        mailer.clone() as Arc<dyn Mailer>,
    );
    let app = portfolio_api::app(state);

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        mailer,
        tokens,
        client: reqwest::Client::new(),
    })
}

impl TestServer {
    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let req = self.client.request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send and return status plus JSON body.
    pub async fn call(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut req = self.request(method, path, token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, path, token, None).await
    }

    /// Site-owner token from POST /portfolio/login
    pub async fn owner_token(&self) -> Result<String> {
        let (status, body) = self
            .post("/portfolio/login", None, json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "site login failed: {} {}", status, body);
        body["token"].as_str().map(str::to_string).context("no token in login response")
    }

    /// Register an account and log it in; returns (access token, user id).
    pub async fn account(&self, email: &str, password: &str) -> Result<(String, String)> {
        let (status, body) = self
            .post(
                "/portfolio/user/register",
                None,
                json!({ "name": "Test", "email": email, "password": password }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        self.login(email, password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(String, String)> {
        let (status, body) = self
            .post("/portfolio/user/login", None, json!({ "email": email, "password": password }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        let token = body["accessToken"].as_str().context("no accessToken")?.to_string();
        let id = body["user"]["_id"].as_str().context("no user id")?.to_string();
        Ok((token, id))
    }

    pub async fn count(&self, collection: &str) -> Result<u64> {
        Ok(self.store.count(collection, &Filter::new()).await?)
    }

    pub async fn all(&self, collection: &str) -> Result<Vec<Value>> {
        let docs = self.store.find(collection, &Filter::new()).await?;
        Ok(docs.into_iter().map(Value::Object).collect())
    }
}
