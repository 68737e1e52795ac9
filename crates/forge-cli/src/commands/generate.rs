//! Generate command

use anyhow::{Context, Result};
use forge_gen::providers::{create_image_generator, create_inference};
use forge_gen::{
    AccountStore, AssetSession, DetailLevel, ForgeConfig, GenerationRequest, PromptResolver,
    TextureSynthesizer,
};
use std::path::Path;
use std::time::Duration;

pub struct GenerateArgs {
    pub prompt: String,
    pub detail: Option<DetailLevel>,
    /// Command-line override; `None` uses the configured default
    pub texture: Option<bool>,
    pub provider: Option<String>,
    pub output: String,
    pub timeout: Option<u64>,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let config = ForgeConfig::load()?;
    let store = AccountStore::default_store();
    let account = store.load_or(config.initial_account())?;

    let provider_name = args
        .provider
        .as_deref()
        .unwrap_or(config.generation.provider.as_str());
    let include_texture = args.texture.unwrap_or(config.generation.include_texture);
    let detail = args.detail.unwrap_or(config.generation.default_detail);

    let resolver = PromptResolver::new(create_inference(provider_name, &config)?);
    let synthesizer = if include_texture {
        match create_image_generator(provider_name, &config)? {
            Some(generator) => TextureSynthesizer::new(generator),
            None => {
                eprintln!("Warning: no image collaborator configured, generating without texture");
                TextureSynthesizer::disabled()
            }
        }
    } else {
        TextureSynthesizer::disabled()
    };

    let timeout = match args.timeout {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.request_timeout(),
    };

    let mut session =
        AssetSession::new(resolver, synthesizer, account).with_request_timeout(timeout);

    println!("Generating '{}' via {}...", args.prompt, provider_name);
    println!("  Account: {} ({} credits)", account.tier, account.credits);

    let request = GenerationRequest::new(args.prompt)
        .with_detail(detail)
        .with_texture(include_texture);
    let descriptor = session.generate(request)?.clone();

    let json = serde_json::to_string_pretty(&descriptor)?;
    let output = Path::new(&args.output);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    store.save(&session.account())?;

    let preview = session
        .preview()
        .context("session finished without an asset")?;

    println!("  Name: {}", descriptor.name());
    println!("  Shape: {}", descriptor.shape());
    println!("  Color: {}", descriptor.color());
    println!(
        "  Material: roughness {:.2}, metalness {:.2}",
        descriptor.roughness(),
        descriptor.metalness()
    );
    let [x, y, z] = descriptor.scale().to_array();
    println!("  Scale: [{}, {}, {}]", x, y, z);
    match descriptor.texture() {
        Some(texture) => println!(
            "  Texture: {} ({}x{})",
            texture.mime_type, texture.width, texture.height
        ),
        None => println!("  Texture: none"),
    }
    println!(
        "  Detail: {} ({} segments)",
        preview.recipe.detail, preview.recipe.segment_count
    );
    println!("  Id: {}", descriptor.id());
    println!("  Written: {}", output.display());
    println!("  Credits remaining: {}", session.account().credits);
    Ok(())
}
