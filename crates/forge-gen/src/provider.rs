//! Collaborator traits and request/response types
//!
//! The pipeline talks to two external services: a structured-inference
//! service that turns text into JSON, and an image-generation service that
//! returns inline image parts. Both sit behind traits so the Gemini client
//! and the offline mocks are interchangeable.

use forge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Point in time after which a generation request is abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires
    pub fn none() -> Self {
        Self { expires_at: None }
    }

    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + timeout),
        }
    }

    pub fn at(instant: Instant) -> Self {
        Self {
            expires_at: Some(instant),
        }
    }

    /// Time left, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail with `DeadlineExceeded` naming `stage` if already expired
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.is_expired() {
            return Err(ForgeError::DeadlineExceeded(stage.to_string()));
        }
        Ok(())
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

/// A request for a JSON object conforming to `schema`
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub system_instruction: String,
    pub contents: String,
    pub schema: serde_json::Value,
    pub deadline: Deadline,
}

/// A request for an image matching a text description
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub deadline: Deadline,
}

/// Inline binary payload inside a response part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// One part of a multi-part image-generation response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

impl ResponsePart {
    pub fn image(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }
}

/// Status returned by a provider health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Available,
    Unavailable(String),
    NoApiKey,
}

/// Text to structured JSON
pub trait StructuredInference: Send {
    /// Provider name (e.g. "gemini", "mock")
    fn name(&self) -> &str;

    fn health_check(&self) -> Result<ProviderStatus>;

    /// Return the raw response text, expected to be a JSON object
    fn infer_json(&self, request: &InferenceRequest) -> Result<String>;
}

/// Text to image parts
pub trait ImageGeneration: Send {
    fn name(&self) -> &str;

    fn health_check(&self) -> Result<ProviderStatus>;

    fn generate_image(&self, request: &ImageRequest) -> Result<Vec<ResponsePart>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_deadline_never_expires() {
        let d = Deadline::none();
        assert!(!d.is_expired());
        assert_eq!(d.remaining(), None);
        assert!(d.check("resolution").is_ok());
    }

    #[test]
    fn test_past_deadline_is_expired() {
        let d = Deadline::at(Instant::now());
        assert!(d.is_expired());
        assert_eq!(d.remaining(), Some(Duration::ZERO));
        match d.check("texture synthesis") {
            Err(ForgeError::DeadlineExceeded(stage)) => assert_eq!(stage, "texture synthesis"),
            other => panic!("expected deadline error, got {:?}", other),
        }
    }

    #[test]
    fn test_future_deadline_has_time_left() {
        let d = Deadline::after(Duration::from_secs(60));
        assert!(!d.is_expired());
        assert!(d.remaining().unwrap() > Duration::from_secs(50));
    }

    #[test]
    fn test_response_part_wire_names() {
        let json = r#"{"inlineData": {"mimeType": "image/png", "data": "AAAA"}}"#;
        let part: ResponsePart = serde_json::from_str(json).unwrap();
        assert_eq!(part, ResponsePart::image("image/png", "AAAA".to_string()));
    }
}
