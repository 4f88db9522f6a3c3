use std::path::Path;

use anyhow::{anyhow, Context, Result};
use reqwest::multipart;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatRequest {
    message: String,
}

/// Reply envelope for `POST /chat`. On `success` the agent's text is in
/// `response`; otherwise `error` carries the agent's own error string.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResult {
    pub success: bool,
    pub response: Option<String>,
    pub error: Option<String>,
}

/// Reply envelope for `POST /upload`. On `success` the server echoes the
/// stored `filename`, which is what the agent expects to be told about.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub filename: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one chat message and returns the agent's reply envelope.
    /// An `Err` here means the request itself never completed.
    pub async fn chat(&self, message: &str) -> Result<ChatResult> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "chat request failed with status: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }

    /// Uploads a local file as the multipart `file` field, preserving its
    /// filename so the agent can refer to it later.
    pub async fn upload(&self, path: &Path) -> Result<UploadResult> {
        let url = format!("{}/upload", self.base_url);

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("not a file path: {}", path.display()))?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?;

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "upload request failed with status: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}
