//! Gemini collaborator (Google Generative Language API)
//!
//! Implements both structured inference (JSON mode with a response schema)
//! and image generation (inline image parts) over `generateContent`.
//! Requests are blocking and single-shot: no retry, the caller falls back.

use crate::config::ForgeConfig;
use crate::provider::*;
use forge_core::{ForgeError, Result};
use std::time::Duration;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Shared HTTP plumbing for both Gemini collaborators
#[derive(Debug, Clone)]
struct GeminiClient {
    api_key: String,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    fn from_config(config: &ForgeConfig, model: &str) -> Option<Self> {
        let api_key = config.api_key("gemini")?.to_string();
        let api_url = config
            .api_url("gemini")
            .unwrap_or(DEFAULT_GEMINI_URL)
            .trim_end_matches('/')
            .to_string();
        let timeout = config
            .request_timeout()
            .unwrap_or(Duration::from_secs(REQUEST_TIMEOUT_SECS));

        Some(Self {
            api_key,
            api_url,
            model: model.to_string(),
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    /// POST a `generateContent` payload, bounded by `deadline`
    fn generate_content(
        &self,
        payload: &serde_json::Value,
        deadline: Deadline,
    ) -> Result<serde_json::Value> {
        deadline.check("gemini request")?;
        let timeout = match deadline.remaining() {
            Some(left) => left.min(self.timeout),
            None => self.timeout,
        };

        tracing::debug!(model = %self.model, timeout_ms = timeout.as_millis() as u64, "gemini request");
        let response = build_agent(timeout)
            .post(&self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .send_json(payload);

        match response {
            Ok(mut ok) => ok.body_mut().read_json().map_err(|e| {
                ForgeError::ProviderError(format!("Failed to parse Gemini response: {}", e))
            }),
            Err(ureq::Error::Timeout(_)) => {
                Err(ForgeError::DeadlineExceeded("gemini request".to_string()))
            }
            Err(e) => Err(ForgeError::ProviderError(format!(
                "Gemini API request failed: {}",
                e
            ))),
        }
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    config.into()
}

/// First candidate's parts, or an error naming what was missing
fn candidate_parts(response: &serde_json::Value) -> Result<Vec<ResponsePart>> {
    let parts = response
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .ok_or_else(|| {
            let reason = response
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(|r| r.as_str())
                .unwrap_or("no candidates");
            ForgeError::ProviderError(format!("Gemini returned no content: {}", reason))
        })?;

    serde_json::from_value(parts.clone())
        .map_err(|e| ForgeError::ProviderError(format!("Unexpected Gemini parts format: {}", e)))
}

/// Concatenated text of the first candidate
pub fn parse_text_response(json: &str) -> Result<String> {
    let response: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ForgeError::ProviderError(format!("Invalid JSON: {}", e)))?;
    let text: String = candidate_parts(&response)?
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.is_empty() {
        return Err(ForgeError::ProviderError("No text returned".to_string()));
    }
    Ok(text)
}

/// All parts of the first candidate
pub fn parse_parts_response(json: &str) -> Result<Vec<ResponsePart>> {
    let response: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ForgeError::ProviderError(format!("Invalid JSON: {}", e)))?;
    candidate_parts(&response)
}

/// Structured inference via Gemini JSON mode.
///
/// Without an API key the collaborator still exists but every call fails,
/// so resolution falls back rather than refusing to run.
pub struct GeminiInference {
    client: Option<GeminiClient>,
}

impl GeminiInference {
    pub fn from_config(config: &ForgeConfig) -> Self {
        Self {
            client: GeminiClient::from_config(config, &config.generation.inference_model),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn build_payload(request: &InferenceRequest) -> serde_json::Value {
        serde_json::json!({
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.contents }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.schema
            }
        })
    }
}

impl StructuredInference for GeminiInference {
    fn name(&self) -> &str {
        "gemini"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        match self.client {
            Some(_) => Ok(ProviderStatus::Available),
            None => Ok(ProviderStatus::NoApiKey),
        }
    }

    fn infer_json(&self, request: &InferenceRequest) -> Result<String> {
        let client = self.client.as_ref().ok_or_else(|| {
            ForgeError::ConfigError(
                "Gemini API key not configured. Set FORGE_GEMINI_API_KEY or add to .forge/config.toml"
                    .to_string(),
            )
        })?;
        let payload = Self::build_payload(request);
        let response = client.generate_content(&payload, request.deadline)?;
        let text: String = candidate_parts(&response)?
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        if text.is_empty() {
            return Err(ForgeError::ProviderError("No JSON returned".to_string()));
        }
        Ok(text)
    }
}

/// Image generation via a Gemini image model
pub struct GeminiImageGenerator {
    client: GeminiClient,
}

impl GeminiImageGenerator {
    /// `None` when no API key is configured
    pub fn from_config(config: &ForgeConfig) -> Option<Self> {
        GeminiClient::from_config(config, &config.generation.image_model).map(|client| Self { client })
    }

    pub fn build_payload(request: &ImageRequest) -> serde_json::Value {
        serde_json::json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }]
        })
    }
}

impl ImageGeneration for GeminiImageGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<Vec<ResponsePart>> {
        let payload = Self::build_payload(request);
        let response = self.client.generate_content(&payload, request.deadline)?;
        candidate_parts(&response)
    }
}
