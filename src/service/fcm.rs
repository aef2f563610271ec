use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Upper bound the provider accepts in one multicast request.
pub const PUSH_BATCH_SIZE: usize = 500;

/// One provider request: shared content addressed to at most
/// `PUSH_BATCH_SIZE` device tokens.
#[derive(Debug, Clone, Serialize)]
pub struct PushBatch {
    pub tokens: Vec<String>,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

/// Batch-level outcome. Tokens the provider no longer recognises are
/// reported so their owner can forget them.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub delivered: usize,
    pub invalid_tokens: Vec<String>,
}

#[derive(Error, Debug)]
pub enum PushError {
    #[error("push provider is not configured")]
    NotConfigured,

    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push provider rejected batch with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn send_batch(&self, batch: &PushBatch) -> Result<BatchReport, PushError>;
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    success: usize,
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    error: Option<String>,
}

/// Firebase Cloud Messaging client using the multicast send endpoint.
#[derive(Debug, Clone)]
pub struct FcmClient {
    client: reqwest::Client,
    endpoint: String,
    server_key: Option<String>,
}

impl FcmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.fcm_endpoint.clone(),
            server_key: config.fcm_server_key.clone(),
        }
    }
}

fn is_dead_token(error: &str) -> bool {
    matches!(error, "NotRegistered" | "InvalidRegistration")
}

#[async_trait]
impl PushProvider for FcmClient {
    async fn send_batch(&self, batch: &PushBatch) -> Result<BatchReport, PushError> {
        let server_key = self.server_key.as_ref().ok_or(PushError::NotConfigured)?;

        let payload = serde_json::json!({
            "registration_ids": batch.tokens,
            "notification": {
                "title": batch.title,
                "body": batch.body,
            },
            "data": batch.data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", server_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected { status, body });
        }

        let parsed: FcmResponse = response.json().await?;

        // Results come back in the order the tokens were sent
        let invalid_tokens = batch
            .tokens
            .iter()
            .zip(parsed.results.iter())
            .filter(|(_, result)| result.error.as_deref().map(is_dead_token).unwrap_or(false))
            .map(|(token, _)| token.clone())
            .collect();

        Ok(BatchReport {
            delivered: parsed.success,
            invalid_tokens,
        })
    }
}
