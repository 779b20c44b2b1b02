//! OpenAI-style API client implementing both provider traits

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

use super::completion::{ChatMessage, CompletionProvider};
use super::embedding::EmbeddingProvider;

/// Maximum number of inputs sent per embedding request
const EMBED_REQUEST_BATCH: usize = 64;

/// Client for an OpenAI-style `/v1/embeddings` and `/v1/chat/completions` API
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: String,
    /// Configuration
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl OpenAiClient {
    /// Create a new client from validated credentials
    pub fn new(config: &OpenAiConfig, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::config("API key is empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }

    /// Verify the API key with a minimal completion request
    pub async fn validate_key(&self) -> Result<()> {
        let messages = [
            ChatMessage::system("Test Prompt"),
            ChatMessage::user("Hello"),
        ];
        // max_tokens pinned low to keep the probe cheap
        self.complete(&self.config.default_model, &messages, 0.0, 5)
            .await
            .map(|_| ())
    }

    async fn embed_request(&self, input: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.config.base_url);
        let request = EmbedRequest {
            model: &self.config.embed_model,
            input,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!("HTTP {} - {}", status, body)));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("failed to parse response: {}", e)))?;

        if embed_response.data.len() != input.len() {
            return Err(Error::embedding(format!(
                "service returned {} vectors for {} inputs",
                embed_response.data.len(),
                input.len()
            )));
        }

        Ok(embed_response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.embed_request(&input).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("service returned no vector"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_REQUEST_BATCH) {
            embeddings.extend(self.embed_request(batch).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let request = CompletionRequest {
            model,
            messages,
            temperature,
            max_tokens,
        };

        tracing::debug!("Requesting completion from model '{}'", model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::completion(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::completion(format!("HTTP {} - {}", status, body)));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::completion(format!("failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::completion("response contained no choices"))
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn large_context_model(&self) -> &str {
        &self.config.large_context_model
    }

    fn name(&self) -> &str {
        "openai"
    }
}
