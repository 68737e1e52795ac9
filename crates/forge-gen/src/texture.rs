//! Best-effort texture synthesis
//!
//! A texture is purely additive: every failure, including having no image
//! collaborator configured at all, results in `None` and a flat material.

use crate::descriptor::TextureImage;
use crate::provider::{Deadline, ImageGeneration, ImageRequest, ResponsePart};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use forge_core::{ForgeError, Result};

/// Wrap the user's prompt in the texture-map instruction
pub fn texture_prompt(prompt: &str) -> String {
    format!(
        "Create a seamless texture map for: {}. Top down view, flat lighting, high resolution texture.",
        prompt
    )
}

/// Take the first part carrying inline `image/*` data and decode it
pub fn extract_texture(parts: &[ResponsePart]) -> Result<TextureImage> {
    let inline = parts
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .find(|d| d.mime_type.starts_with("image/") && !d.data.is_empty())
        .ok_or_else(|| ForgeError::ProviderError("response contains no inline image".to_string()))?;

    let bytes = BASE64
        .decode(inline.data.trim())
        .map_err(|e| ForgeError::ProviderError(format!("image payload is not base64: {}", e)))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| ForgeError::ProviderError(format!("image payload does not decode: {}", e)))?;

    Ok(TextureImage {
        mime_type: inline.mime_type.clone(),
        data: inline.data.trim().to_string(),
        width: image.width(),
        height: image.height(),
    })
}

pub struct TextureSynthesizer {
    generator: Option<Box<dyn ImageGeneration>>,
}

impl TextureSynthesizer {
    pub fn new(generator: Box<dyn ImageGeneration>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// A synthesizer with no image collaborator; always yields `None`
    pub fn disabled() -> Self {
        Self { generator: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub fn synthesize(&self, prompt: &str) -> Option<TextureImage> {
        self.synthesize_within(prompt, Deadline::none())
    }

    /// Single attempt; any failure is logged and dropped
    pub fn synthesize_within(&self, prompt: &str, deadline: Deadline) -> Option<TextureImage> {
        let Some(generator) = &self.generator else {
            tracing::debug!("no image collaborator configured, skipping texture");
            return None;
        };

        let request = ImageRequest {
            prompt: texture_prompt(prompt),
            deadline,
        };
        let result = generator
            .generate_image(&request)
            .and_then(|parts| extract_texture(&parts));

        match result {
            Ok(texture) => {
                tracing::debug!(
                    provider = generator.name(),
                    width = texture.width,
                    height = texture.height,
                    "texture synthesized"
                );
                Some(texture)
            }
            Err(e) => {
                tracing::warn!(provider = generator.name(), error = %e, "texture synthesis failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::{solid_png_base64, MockImageGenerator};

    #[test]
    fn test_first_inline_image_wins() {
        let first = solid_png_base64("first", 2, 2).unwrap();
        let second = solid_png_base64("second", 8, 8).unwrap();
        let parts = vec![
            ResponsePart::text("here is your texture"),
            ResponsePart::image("image/png", first.clone()),
            ResponsePart::image("image/png", second),
        ];
        let texture = extract_texture(&parts).unwrap();
        assert_eq!(texture.data, first);
        assert_eq!((texture.width, texture.height), (2, 2));
        assert_eq!(texture.mime_type, "image/png");
    }

    #[test]
    fn test_empty_inline_part_is_skipped() {
        let good = solid_png_base64("good", 4, 4).unwrap();
        let parts = vec![
            ResponsePart::image("image/png", String::new()),
            ResponsePart::image("image/png", good.clone()),
        ];
        assert_eq!(extract_texture(&parts).unwrap().data, good);
    }

    #[test]
    fn test_non_image_inline_part_is_skipped() {
        let data = solid_png_base64("audio", 4, 4).unwrap();
        let parts = vec![ResponsePart::image("audio/wav", data)];
        assert!(extract_texture(&parts).is_err());
    }

    #[test]
    fn test_synthesize_returns_texture() {
        let synth = TextureSynthesizer::new(Box::new(MockImageGenerator::new()));
        let texture = synth.synthesize("mossy stone").unwrap();
        assert!(texture.data_uri().starts_with("data:image/png;base64,"));
        assert!(texture.width > 0);
    }

    #[test]
    fn test_text_only_response_yields_none() {
        let synth = TextureSynthesizer::new(Box::new(MockImageGenerator::returning(vec![
            ResponsePart::text("I cannot draw that"),
        ])));
        assert!(synth.synthesize("a forbidden texture").is_none());
    }

    #[test]
    fn test_collaborator_error_yields_none() {
        let synth = TextureSynthesizer::new(Box::new(MockImageGenerator::failing("quota exceeded")));
        assert!(synth.synthesize("bark").is_none());
    }

    #[test]
    fn test_undecodable_payloads_yield_none() {
        for data in ["%%% not base64 %%%", "aGVsbG8gd29ybGQ="] {
            let synth = TextureSynthesizer::new(Box::new(MockImageGenerator::returning(vec![
                ResponsePart::image("image/png", data.to_string()),
            ])));
            assert!(synth.synthesize("noise").is_none(), "payload {:?}", data);
        }
    }

    #[test]
    fn test_disabled_synthesizer() {
        let synth = TextureSynthesizer::disabled();
        assert!(!synth.is_enabled());
        assert!(synth.synthesize("anything").is_none());
    }

    #[test]
    fn test_texture_prompt_wording() {
        let mock = MockImageGenerator::new();
        let log = mock.request_log();
        TextureSynthesizer::new(Box::new(mock)).synthesize("rusty metal");
        let requests = log.lock().unwrap();
        assert_eq!(
            requests[0].prompt,
            "Create a seamless texture map for: rusty metal. Top down view, flat lighting, high resolution texture."
        );
    }
}
