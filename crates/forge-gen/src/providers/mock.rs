//! Mock collaborators for offline use and testing
//!
//! `MockInference` maps prompt keywords to shapes and materials without any
//! network calls; `MockImageGenerator` returns a solid-colour PNG. Both can be
//! scripted with a fixed reply or error and record every request they see.

use crate::provider::*;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use forge_core::{ForgeError, Result};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

const MOCK_TEXTURE_SIZE: u32 = 64;

/// Keyword table for the heuristic shape guess, first match wins
const SHAPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("cylinder", &["barrel", "can", "pillar", "column", "pipe", "tube", "log"]),
    ("sphere", &["ball", "orb", "planet", "globe", "pearl", "bubble"]),
    ("torus", &["ring", "donut", "doughnut", "tire", "tyre", "halo"]),
    ("cone", &["cone", "spike", "horn", "funnel", "spire"]),
    ("capsule", &["pill", "capsule", "bean", "pod"]),
    ("dodecahedron", &["gem", "crystal", "dice", "die", "jewel"]),
];

const METAL_KEYWORDS: &[&str] = &["metal", "steel", "iron", "gold", "silver", "chrome", "copper", "rusty"];
const ROUGH_KEYWORDS: &[&str] = &["rusty", "stone", "rock", "wood", "wooden", "mossy", "rough", "old"];
const FILLER_WORDS: &[&str] = &["a", "an", "the", "of", "with", "some"];

/// Stable 32-bit hash of a string, used for deterministic colours
fn name_hash(name: &str) -> u32 {
    name.bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
}

fn name_color(name: &str) -> [u8; 3] {
    let h = name_hash(name);
    [((h >> 16) & 0xFF) as u8, ((h >> 8) & 0xFF) as u8, (h & 0xFF) as u8]
}

/// Guess asset parameters from prompt keywords, as a schema-conforming JSON reply
pub fn heuristic_reply(prompt: &str) -> serde_json::Value {
    let lower = prompt.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has_any = |keys: &[&str]| words.iter().any(|w| keys.contains(w));

    let shape = SHAPE_KEYWORDS
        .iter()
        .find(|(_, keys)| has_any(keys))
        .map(|(shape, _)| *shape)
        .unwrap_or("box");
    let [r, g, b] = name_color(&lower);
    let metalness = if has_any(METAL_KEYWORDS) { 0.8 } else { 0.1 };
    let roughness = if has_any(ROUGH_KEYWORDS) { 0.8 } else { 0.4 };

    let name = words
        .iter()
        .filter(|w| !FILLER_WORDS.contains(*w))
        .take(3)
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    serde_json::json!({
        "shape": shape,
        "color": format!("#{:02x}{:02x}{:02x}", r, g, b),
        "roughness": roughness,
        "metalness": metalness,
        "scale": [1.0, 1.0, 1.0],
        "name": name,
    })
}

/// Encode a solid-colour PNG derived from `name` as base64
pub fn solid_png_base64(name: &str, width: u32, height: u32) -> Result<String> {
    let [r, g, b] = name_color(name);
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..(width * height) {
        pixels.extend_from_slice(&[r, g, b, 255]);
    }

    let img = image::RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
        ForgeError::ProviderError("Failed to create image buffer".to_string())
    })?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ForgeError::ProviderError(format!("Failed to encode PNG: {}", e)))?;

    Ok(BASE64.encode(&png))
}

#[derive(Debug, Clone)]
enum Script<T> {
    Generate,
    Respond(T),
    Fail(String),
}

/// Offline structured-inference collaborator
pub struct MockInference {
    script: Script<String>,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl MockInference {
    /// Keyword-heuristic mode
    pub fn new() -> Self {
        Self::with_script(Script::Generate)
    }

    /// Always reply with `text` verbatim
    pub fn responding(text: &str) -> Self {
        Self::with_script(Script::Respond(text.to_string()))
    }

    /// Always fail with a provider error
    pub fn failing(message: &str) -> Self {
        Self::with_script(Script::Fail(message.to_string()))
    }

    fn with_script(script: Script<String>) -> Self {
        Self {
            script,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to every request received, for assertions after the
    /// mock has been moved into a resolver
    pub fn request_log(&self) -> Arc<Mutex<Vec<InferenceRequest>>> {
        Arc::clone(&self.requests)
    }

    fn record(&self, request: &InferenceRequest) {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
    }
}

impl Default for MockInference {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuredInference for MockInference {
    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        match &self.script {
            Script::Fail(message) => Ok(ProviderStatus::Unavailable(message.clone())),
            _ => Ok(ProviderStatus::Available),
        }
    }

    fn infer_json(&self, request: &InferenceRequest) -> Result<String> {
        self.record(request);
        request.deadline.check("inference request")?;

        match &self.script {
            Script::Generate => {
                let prompt = request
                    .contents
                    .strip_prefix("Analyze this request: \"")
                    .and_then(|p| p.strip_suffix('"'))
                    .unwrap_or(request.contents.as_str());
                Ok(heuristic_reply(prompt).to_string())
            }
            Script::Respond(text) => Ok(text.clone()),
            Script::Fail(message) => Err(ForgeError::ProviderError(message.clone())),
        }
    }
}

/// Offline image-generation collaborator
pub struct MockImageGenerator {
    script: Script<Vec<ResponsePart>>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl MockImageGenerator {
    /// Solid-colour PNG mode
    pub fn new() -> Self {
        Self::with_script(Script::Generate)
    }

    /// Always reply with `parts`
    pub fn returning(parts: Vec<ResponsePart>) -> Self {
        Self::with_script(Script::Respond(parts))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_script(Script::Fail(message.to_string()))
    }

    fn with_script(script: Script<Vec<ResponsePart>>) -> Self {
        Self {
            script,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_log(&self) -> Arc<Mutex<Vec<ImageRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageGeneration for MockImageGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<Vec<ResponsePart>> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        request.deadline.check("image request")?;

        match &self.script {
            Script::Generate => {
                let data = solid_png_base64(&request.prompt, MOCK_TEXTURE_SIZE, MOCK_TEXTURE_SIZE)?;
                Ok(vec![ResponsePart::image("image/png", data)])
            }
            Script::Respond(parts) => Ok(parts.clone()),
            Script::Fail(message) => Err(ForgeError::ProviderError(message.clone())),
        }
    }
}
