//! Provider registry
//!
//! Maps provider names to concrete collaborator implementations.

pub mod gemini;
pub mod mock;

use crate::config::ForgeConfig;
use crate::provider::{ImageGeneration, StructuredInference};
use forge_core::{ForgeError, Result};

/// Create a structured-inference collaborator by name.
///
/// A Gemini provider without an API key still resolves: it becomes a
/// collaborator whose every call fails, so resolution falls back instead of
/// refusing to run.
pub fn create_inference(name: &str, config: &ForgeConfig) -> Result<Box<dyn StructuredInference>> {
    check_enabled(name, config)?;
    match name {
        "mock" => Ok(Box::new(mock::MockInference::new())),
        "gemini" => {
            let provider = gemini::GeminiInference::from_config(config);
            if !provider.is_configured() {
                tracing::warn!("gemini API key not configured, prompts will use the fallback record");
            }
            Ok(Box::new(provider))
        }
        _ => Err(unknown_provider(name)),
    }
}

/// Create an image collaborator by name. `Ok(None)` when the provider has no
/// credentials, which disables textures rather than failing the request.
pub fn create_image_generator(
    name: &str,
    config: &ForgeConfig,
) -> Result<Option<Box<dyn ImageGeneration>>> {
    check_enabled(name, config)?;
    match name {
        "mock" => Ok(Some(Box::new(mock::MockImageGenerator::new()))),
        "gemini" => Ok(gemini::GeminiImageGenerator::from_config(config)
            .map(|g| Box::new(g) as Box<dyn ImageGeneration>)),
        _ => Err(unknown_provider(name)),
    }
}

/// List all available provider names
pub fn available_providers() -> Vec<&'static str> {
    vec!["mock", "gemini"]
}

fn check_enabled(name: &str, config: &ForgeConfig) -> Result<()> {
    if !config.is_enabled(name) {
        return Err(ForgeError::ProviderError(format!(
            "Provider '{}' is disabled in config",
            name
        )));
    }
    Ok(())
}

fn unknown_provider(name: &str) -> ForgeError {
    ForgeError::ProviderError(format!(
        "Unknown provider '{}'. Available: {}",
        name,
        available_providers().join(", ")
    ))
}
