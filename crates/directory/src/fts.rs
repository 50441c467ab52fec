use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pipedump_core::{Credentials, DirectoryConfig, Entity};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::DirectoryError;
use crate::resolver::EntityResolver;

/// Auth token returned by `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
struct AuthToken {
    token: String,
    /// Epoch milliseconds.
    expires: i64,
}

impl AuthToken {
    fn is_valid(&self, now_ms: i64, buffer_ms: i64) -> bool {
        self.expires - now_ms > buffer_ms
    }
}

/// HTTP client for the FTS API entity directory.
pub struct FtsApiDirectory {
    client: reqwest::Client,
    host: String,
    credentials: Credentials,
    token_expiration_buffer_ms: i64,
    batch_size: usize,
    token: Mutex<Option<AuthToken>>,
}

impl FtsApiDirectory {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let credentials = config
            .credentials()
            .map_err(|e| DirectoryError::NotConfigured(e.to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            host: config.host.clone(),
            credentials,
            token_expiration_buffer_ms: i64::try_from(config.token_expiration_buffer_ms)
                .unwrap_or(i64::MAX),
            batch_size: config.batch_size.max(1),
            token: Mutex::new(None),
        })
    }

    /// Health check: `GET /status`, usually `"ok"`.
    pub async fn status(&self) -> Result<String, DirectoryError> {
        let body = self
            .send(self.client.get(format!("{}/status", self.host)))
            .await?;
        body["status"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DirectoryError::Parse("missing status".into()))
    }

    async fn login(&self) -> Result<AuthToken, DirectoryError> {
        debug!(host = %self.host, "logging in to FTS API");
        let body = self
            .send(
                self.client
                    .post(format!("{}/auth/login", self.host))
                    .json(&json!({
                        "email": self.credentials.username,
                        "password": self.credentials.password,
                    })),
            )
            .await?;
        serde_json::from_value(body).map_err(|e| DirectoryError::Parse(format!("login: {e}")))
    }

    /// Current token, logging in again once it is within the expiration buffer.
    async fn token(&self) -> Result<String, DirectoryError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now().timestamp_millis();
        if let Some(token) = cached
            .as_ref()
            .filter(|t| t.is_valid(now, self.token_expiration_buffer_ms))
        {
            return Ok(token.token.clone());
        }
        let fresh = self.login().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn send_authenticated(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, DirectoryError> {
        let token = self.token().await?;
        self.send(
            request
                .header("x-api-key", &self.credentials.api_key)
                .header("x-api-token", token),
        )
        .await
    }

    /// Send a request and read a JSON body. Empty bodies come back as `Value::Null`.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, DirectoryError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        let body: Value =
            serde_json::from_str(&text).map_err(|e| DirectoryError::Parse(e.to_string()))?;

        // The API gateway reports some failures inside a 2xx body.
        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            return Err(DirectoryError::Response(format!(
                "{}: {}",
                error["type"].as_str().unwrap_or("Error"),
                error["message"].as_str().unwrap_or_default()
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl EntityResolver for FtsApiDirectory {
    fn name(&self) -> &str {
        "fts-api"
    }

    async fn resolve(&self, entities: Vec<Entity>) -> Result<Vec<Entity>, DirectoryError> {
        let mut resolved = Vec::with_capacity(entities.len());
        let batches = entities.len().div_ceil(self.batch_size);

        for (i, batch) in entities.chunks(self.batch_size).enumerate() {
            // POST rather than PUT: existing entities are not updated.
            let body = self
                .send_authenticated(
                    self.client
                        .post(format!("{}/entity", self.host))
                        .json(&json!({ "entities": batch })),
                )
                .await?;
            let returned: Vec<Entity> = serde_json::from_value(body["entities"].clone())
                .map_err(|e| DirectoryError::Parse(format!("entities: {e}")))?;
            info!(
                batch = i + 1,
                batches,
                submitted = batch.len(),
                returned = returned.len(),
                "resolved entity batch"
            );
            resolved.extend(returned);
        }
        Ok(resolved)
    }
}
