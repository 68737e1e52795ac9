//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `FORGE_{PROVIDER}_API_KEY`
//! 2. Project-local: `.forge/config.toml`
//! 3. Global: `~/.forge/config.toml`

use crate::entitlement::{Account, Tier};
use crate::geometry::DetailLevel;
use forge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Providers that read an API key from the environment
const KEYED_PROVIDERS: [&str; 1] = ["gemini"];

/// Provider-specific configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            enabled: true,
        }
    }
}

/// Generation defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub provider: String,
    pub inference_model: String,
    pub image_model: String,
    /// Per-request deadline in seconds; 0 disables it
    pub request_timeout_secs: u64,
    pub default_detail: DetailLevel,
    pub include_texture: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            inference_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            request_timeout_secs: 60,
            default_detail: DetailLevel::default(),
            include_texture: true,
        }
    }
}

/// Starting account for a fresh installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    pub tier: Tier,
    pub initial_credits: u32,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            tier: Tier::default(),
            initial_credits: 5,
        }
    }
}

/// One config file as written on disk. Every field is optional so a layer
/// only overrides what it actually sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfigFile {
    pub providers: HashMap<String, ProviderLayer>,
    pub generation: GenerationLayer,
    pub account: AccountLayer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderLayer {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationLayer {
    pub provider: Option<String>,
    pub inference_model: Option<String>,
    pub image_model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub default_detail: Option<DetailLevel>,
    pub include_texture: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountLayer {
    pub tier: Option<Tier>,
    pub initial_credits: Option<u32>,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct ForgeConfig {
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
    pub account: AccountConfig,
}

impl ForgeConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".forge/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        Self::merge_into(&mut config, Self::load_file(path)?);
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    /// Per-request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.generation.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Account used when nothing has been persisted yet
    pub fn initial_account(&self) -> Account {
        Account {
            tier: self.account.tier,
            credits: self.account.initial_credits,
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".forge").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ForgeConfigFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ForgeError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    /// Apply every field the overlay sets; unset fields keep the lower layer
    fn merge_into(base: &mut ForgeConfig, overlay: ForgeConfigFile) {
        for (name, provider) in overlay.providers {
            let entry = base.providers.entry(name).or_default();
            if let Some(key) = provider.api_key {
                entry.api_key = Some(key);
            }
            if let Some(url) = provider.api_url {
                entry.api_url = Some(url);
            }
            if let Some(enabled) = provider.enabled {
                entry.enabled = enabled;
            }
        }

        let gen = overlay.generation;
        let target = &mut base.generation;
        if let Some(provider) = gen.provider {
            target.provider = provider;
        }
        if let Some(model) = gen.inference_model {
            target.inference_model = model;
        }
        if let Some(model) = gen.image_model {
            target.image_model = model;
        }
        if let Some(secs) = gen.request_timeout_secs {
            target.request_timeout_secs = secs;
        }
        if let Some(detail) = gen.default_detail {
            target.default_detail = detail;
        }
        if let Some(include) = gen.include_texture {
            target.include_texture = include;
        }

        if let Some(tier) = overlay.account.tier {
            base.account.tier = tier;
        }
        if let Some(credits) = overlay.account.initial_credits {
            base.account.initial_credits = credits;
        }
    }

    fn apply_env_overrides(config: &mut ForgeConfig) {
        for name in &KEYED_PROVIDERS {
            let env_key = format!("FORGE_{}_API_KEY", name.to_uppercase());
            if let Ok(key) = std::env::var(&env_key) {
                let entry = config.providers.entry(name.to_string()).or_default();
                entry.api_key = Some(key);
            }
        }
    }
}
