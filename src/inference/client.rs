//! Completion client
//!
//! Talks to the engine's OpenAI-compatible completions endpoint.

use serde::{Deserialize, Serialize};

use crate::inference::InferenceError;
use crate::types::config::SamplingConfig;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stop: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    completion_tokens: u64,
}

/// Raw engine output for one prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens: u64,
}

// ============================================================================
// CompletionClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl CompletionClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Submit an already formatted prompt and wait for the full completion
    pub async fn complete(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<Completion, InferenceError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            stop: &sampling.stop,
        };

        let response = self
            .http
            .post(format!("{}/v1/completions", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(&body)
    }
}

fn parse_completion(body: &str) -> Result<Completion, InferenceError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::Malformed(e.to_string()))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or_else(|| InferenceError::Malformed("no choices in response".into()))?;

    let tokens = response
        .usage
        .map(|usage| usage.completion_tokens)
        .ok_or_else(|| InferenceError::Malformed("missing usage".into()))?;

    Ok(Completion { text, tokens })
}
