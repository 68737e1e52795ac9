//! Providers command

use anyhow::Result;
use forge_gen::providers::{available_providers, create_image_generator, create_inference};
use forge_gen::{ForgeConfig, ProviderStatus};

pub fn run() -> Result<()> {
    let config = ForgeConfig::load()?;
    println!("Default provider: {}", config.generation.provider);
    println!(
        "Models: {} (inference), {} (image)\n",
        config.generation.inference_model, config.generation.image_model
    );

    for name in available_providers() {
        if !config.is_enabled(name) {
            println!("  {:<8} disabled", name);
            continue;
        }

        let inference = match create_inference(name, &config) {
            Ok(provider) => describe(provider.health_check()),
            Err(e) => format!("error: {}", e),
        };
        let image = match create_image_generator(name, &config) {
            Ok(Some(provider)) => describe(provider.health_check()),
            Ok(None) => "no API key".to_string(),
            Err(e) => format!("error: {}", e),
        };
        println!("  {:<8} inference: {:<12} image: {}", name, inference, image);
    }
    Ok(())
}

fn describe(status: forge_core::Result<ProviderStatus>) -> String {
    match status {
        Ok(ProviderStatus::Available) => "available".to_string(),
        Ok(ProviderStatus::NoApiKey) => "no API key".to_string(),
        Ok(ProviderStatus::Unavailable(reason)) => format!("unavailable ({})", reason),
        Err(e) => format!("error: {}", e),
    }
}
