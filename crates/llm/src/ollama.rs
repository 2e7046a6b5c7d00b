use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;
use crate::{Embedder, TextGenerator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    #[serde(default = "default_generate_model")]
    pub generate_model: String,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_generate_model() -> String {
    "llama3".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embed_model: default_embed_model(),
            generate_model: default_generate_model(),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedding client against the Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl OllamaEmbedder {
    pub fn new(config: &OllamaConfig, retry: RetryPolicy) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.embed_model.clone(),
            client: reqwest::Client::new(),
            retry,
        }
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send embedding request")?;

        if !response.status().is_success() {
            anyhow::bail!("Embedding request failed: {}", response.status());
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .context("Failed to parse embedding response")?;

        Ok(embedding_response.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.retry
            .retry("embed", || self.request_embedding(text))
            .await
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Text generation client against the Ollama HTTP API. With
/// `json_format` enabled Ollama is asked for structured JSON output,
/// which the extraction prompts rely on.
#[derive(Clone)]
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    json_format: bool,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl OllamaGenerator {
    pub fn new(config: &OllamaConfig, retry: RetryPolicy) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.generate_model.clone(),
            json_format: false,
            client: reqwest::Client::new(),
            retry,
        }
    }

    /// Force JSON output from the model.
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    async fn request_generation(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            format: self.json_format.then(|| "json".to_string()),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama request failed: {}", response.status());
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(generate_response.response)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.retry
            .retry("generate", || self.request_generation(prompt))
            .await
    }
}
