// Inference Provider Service
// Implements hosted-inference API calls for classification and text generation

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Instant;
use thiserror::Error;

const INFERENCE_DEFAULT_URL: &str = "https://api-inference.huggingface.co/models";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API token not configured")]
    MissingApiToken,
}

/// One label/score pair from a classification model. Label cardinality is
/// model-dependent; normalization into an (ai, human) pair happens downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub latency_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationParameters {
    max_length: usize,
    num_beams: u32,
    do_sample: bool,
    temperature: f64,
    top_k: u32,
    num_return_sequences: u32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationRequest {
    inputs: String,
    parameters: GenerationParameters,
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratedSequence {
    generated_text: Option<String>,
}

/// Options controlling one generation call; mirrors the per-model configs
/// kept in the model catalog.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub max_length: usize,
    pub num_beams: u32,
    pub temperature: f64,
    pub top_k: u32,
}

pub struct InferenceClient {
    client: Client,
    base_url: String,
}

impl Default for InferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceClient {
    /// Base URL resolution order: environment variable, then the stored
    /// config file, then the public hosted-inference endpoint.
    pub fn new() -> Self {
        let base_url = env::var("QUILLFORGE_INFERENCE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(stored_inference_url)
            .unwrap_or_else(|| INFERENCE_DEFAULT_URL.to_string());

        Self::with_base_url(&base_url)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(80))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn model_url(&self, model_id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), model_id)
    }

    /// Run a sequence-classification model over `text`, returning the raw
    /// label distribution as the model reports it.
    pub async fn classify(
        &self,
        model_id: &str,
        api_token: &str,
        text: &str,
    ) -> Result<Vec<LabelScore>, ProviderError> {
        let request = serde_json::json!({
            "inputs": text,
            "options": { "wait_for_model": true }
        });

        let response = self
            .client
            .post(self.model_url(model_id))
            .header("Authorization", format!("Bearer {}", api_token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        // Classification response format: [[{"label": "...", "score": 0.97}, ...]]
        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let rows = data
            .as_array()
            .and_then(|outer| outer.first())
            .and_then(|inner| inner.as_array())
            .ok_or(ProviderError::MissingContent)?;

        let mut scores = Vec::with_capacity(rows.len());
        for row in rows {
            let label = row["label"]
                .as_str()
                .ok_or(ProviderError::MissingContent)?
                .to_string();
            let score = row["score"].as_f64().ok_or(ProviderError::MissingContent)?;
            scores.push(LabelScore { label, score });
        }

        if scores.is_empty() {
            return Err(ProviderError::MissingContent);
        }

        Ok(scores)
    }

    /// Run a text2text generation model over `input`, returning the first
    /// generated sequence.
    pub async fn generate(
        &self,
        model_id: &str,
        api_token: &str,
        input: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, ProviderError> {
        let request = GenerationRequest {
            inputs: input.to_string(),
            parameters: GenerationParameters {
                max_length: options.max_length,
                num_beams: options.num_beams,
                do_sample: true,
                temperature: options.temperature,
                top_k: options.top_k,
                num_return_sequences: 1,
            },
        };

        let start = Instant::now();

        let response = self
            .client
            .post(self.model_url(model_id))
            .header("Authorization", format!("Bearer {}", api_token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        // Generation response format: [{"generated_text": "..."}]
        let data: Vec<GeneratedSequence> = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let text = data
            .into_iter()
            .next()
            .and_then(|s| s.generated_text)
            .ok_or(ProviderError::MissingContent)?;

        Ok(GenerationResult { text, latency_ms })
    }
}

fn stored_inference_url() -> Option<String> {
    let store = super::ConfigStore::new(super::ConfigStore::default_config_dir()?);
    store.get_inference_url().ok().flatten()
}

/// Get the inference API token from environment or config file.
pub fn get_api_token() -> Option<String> {
    for key in ["QUILLFORGE_API_TOKEN", "HF_API_TOKEN"] {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    if let Some(config_dir) = super::ConfigStore::default_config_dir() {
        let store = super::ConfigStore::new(config_dir);
        if let Ok(Some(token)) = store.get_api_token() {
            return Some(token);
        }
    }

    None
}
