use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{GeneratedContent, TextGenerator};
use crate::error::AiError;

/// Thin client for the generative text endpoint. When a response schema is
/// supplied the service is asked for structured JSON; otherwise raw text.
pub struct HttpTextGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTextGenerator {
    pub fn new(endpoint: &str, api_key: &str, timeout_secs: u64) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(
        &self,
        prompt: &str,
        response_schema: Option<Value>,
    ) -> Result<GeneratedContent, AiError> {
        let structured = response_schema.is_some();
        let body = json!({
            "prompt": prompt,
            "response_schema": response_schema,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AiError::Rejected {
                status: resp.status().as_u16(),
            });
        }

        if structured {
            let value: Value = resp
                .json()
                .await
                .map_err(|e| AiError::Malformed(e.to_string()))?;
            Ok(GeneratedContent::Structured(value))
        } else {
            let text = resp
                .text()
                .await
                .map_err(|e| AiError::Malformed(e.to_string()))?;
            Ok(GeneratedContent::Text(text))
        }
    }
}
