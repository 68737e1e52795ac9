//! Prompt to asset parameters
//!
//! Sends the prompt to a structured-inference collaborator with a fixed
//! response schema. Any transport error, non-JSON reply or schema mismatch is
//! absorbed here: the caller always gets parameters back, and gets the
//! fallback record when the collaborator could not deliver.

use crate::descriptor::{AssetParameters, Shape};
use crate::provider::{Deadline, InferenceRequest, StructuredInference};
use forge_core::{ForgeError, HexColor, Result, Scale};
use serde::Deserialize;

pub const SYSTEM_INSTRUCTION: &str = r#"You are a 3D procedural engine configuration assistant.
Your job is to translate a user's creative text description into specific 3D parameters for a real-time scene.
Analyze the prompt and determine the most appropriate geometric primitive and material properties.

Supported Shapes: box, sphere, cylinder, torus, cone, capsule, dodecahedron.
Default to 'box' if unsure.
Scale should be a vector [x, y, z], typically around [1, 1, 1].
Roughness and Metalness are 0.0 to 1.0.
Color should be a hex string.
"#;

/// Response schema sent with every inference request
pub fn response_schema() -> serde_json::Value {
    let shapes: Vec<&str> = Shape::ALL.iter().map(|s| s.as_str()).collect();
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "shape": { "type": "STRING", "enum": shapes },
            "color": { "type": "STRING", "description": "Hex color code, e.g. #ff0000" },
            "roughness": { "type": "NUMBER" },
            "metalness": { "type": "NUMBER" },
            "scale": {
                "type": "ARRAY",
                "items": { "type": "NUMBER" },
                "description": "Array of 3 numbers for X, Y, Z scale"
            },
            "name": { "type": "STRING", "description": "A short display name for the asset" }
        },
        "required": ["shape", "color", "roughness", "metalness", "scale", "name"]
    })
}

/// Wire shape of a schema-conforming response. Every field is required.
#[derive(Debug, Deserialize)]
struct InferredAsset {
    shape: Shape,
    color: String,
    roughness: f64,
    metalness: f64,
    scale: Vec<f64>,
    name: String,
}

impl From<InferredAsset> for AssetParameters {
    fn from(raw: InferredAsset) -> Self {
        let finite = |v: f64| Some(v).filter(|v| v.is_finite());
        Self {
            shape: Some(raw.shape),
            color: HexColor::parse(raw.color.trim()),
            roughness: finite(raw.roughness),
            metalness: finite(raw.metalness),
            scale: Some(Scale::from_components(&raw.scale).unwrap_or(Scale::ONE)),
            name: Some(raw.name.trim().to_string()).filter(|n| !n.is_empty()),
        }
    }
}

/// Strip a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Decode a raw inference reply into parameters, or explain why it is unusable
pub fn parse_inference_response(text: &str) -> Result<AssetParameters> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(ForgeError::SchemaError("empty response".to_string()));
    }
    let inferred: InferredAsset = serde_json::from_str(body)
        .map_err(|e| ForgeError::SchemaError(format!("response does not match schema: {}", e)))?;
    Ok(inferred.into())
}

pub struct PromptResolver {
    inference: Box<dyn StructuredInference>,
}

impl PromptResolver {
    pub fn new(inference: Box<dyn StructuredInference>) -> Self {
        Self { inference }
    }

    pub fn provider_name(&self) -> &str {
        self.inference.name()
    }

    /// Resolve `prompt` with no deadline
    pub fn resolve(&self, prompt: &str) -> AssetParameters {
        self.resolve_within(prompt, Deadline::none())
    }

    /// Resolve `prompt`, passing `deadline` to the collaborator. One attempt;
    /// every failure yields [`AssetParameters::fallback`].
    pub fn resolve_within(&self, prompt: &str, deadline: Deadline) -> AssetParameters {
        match self.try_resolve(prompt, deadline) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(
                    provider = self.inference.name(),
                    error = %e,
                    "prompt resolution failed, using fallback record"
                );
                AssetParameters::fallback()
            }
        }
    }

    fn try_resolve(&self, prompt: &str, deadline: Deadline) -> Result<AssetParameters> {
        let request = InferenceRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            contents: format!("Analyze this request: \"{}\"", prompt),
            schema: response_schema(),
            deadline,
        };
        tracing::debug!(provider = self.inference.name(), "requesting asset parameters");
        let text = self.inference.infer_json(&request)?;
        parse_inference_response(&text)
    }
}
