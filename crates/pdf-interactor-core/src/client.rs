use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AskError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: Option<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    message: String,
}

/// HTTP client for the external Q&A backend
#[derive(Clone)]
pub struct QaClient {
    client: Client,
    base_url: String,
}

impl QaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one question to `POST /ask` and return the answer text.
    ///
    /// No retries and no timeout: the request settles when the transport
    /// says so.
    pub async fn ask(&self, question: &str) -> Result<String, AskError> {
        let url = format!("{}/ask", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(|e| AskError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            return Err(AskError::Status(reason));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AskError::Transport(e.to_string()))?;

        let parsed: AskResponse = serde_json::from_str(&body)
            .map_err(|e| AskError::Malformed(format!("invalid response body: {}", e)))?;

        parsed
            .answer
            .ok_or_else(|| AskError::Malformed("response is missing the \"answer\" field".to_string()))
    }

    /// Probe `GET /` and return the backend's status message
    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Health check failed with status: {}", response.status()));
        }

        let health: HealthResponse = response.json().await?;
        Ok(health.message)
    }
}
