//! Resolved asset parameters and the immutable asset descriptor

use forge_core::{AssetId, ForgeError, HexColor, Result, Scale};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ROUGHNESS: f64 = 0.5;
pub const DEFAULT_METALNESS: f64 = 0.5;
pub const DEFAULT_NAME: &str = "Generated Asset";

/// Primitive shape family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Box,
    Sphere,
    Cylinder,
    Torus,
    Cone,
    Capsule,
    Dodecahedron,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::Box,
        Shape::Sphere,
        Shape::Cylinder,
        Shape::Torus,
        Shape::Cone,
        Shape::Capsule,
        Shape::Dodecahedron,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Box => "box",
            Shape::Sphere => "sphere",
            Shape::Cylinder => "cylinder",
            Shape::Torus => "torus",
            Shape::Cone => "cone",
            Shape::Capsule => "capsule",
            Shape::Dodecahedron => "dodecahedron",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Shape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Shape::ALL.iter().map(|s| s.as_str()).collect();
                format!("unknown shape '{}'; valid values: {}", s, names.join(", "))
            })
    }
}

/// Asset parameters produced by the prompt resolver.
///
/// A `None` field means the resolver had nothing usable for it; assembly
/// substitutes the documented default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetParameters {
    pub shape: Option<Shape>,
    pub color: Option<HexColor>,
    pub roughness: Option<f64>,
    pub metalness: Option<f64>,
    pub scale: Option<Scale>,
    pub name: Option<String>,
}

impl AssetParameters {
    /// Record substituted whenever resolution fails
    pub fn fallback() -> Self {
        Self {
            shape: Some(Shape::Sphere),
            color: HexColor::parse("#cccccc"),
            roughness: Some(0.5),
            metalness: Some(0.5),
            scale: Some(Scale::ONE),
            name: Some("Unknown Object".to_string()),
        }
    }
}

/// An encoded texture image returned by the image collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureImage {
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl TextureImage {
    /// `data:` URI form consumed by web renderers
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// The resolved, renderable description of one generated asset.
///
/// Only built by [`AssetDescriptor::assemble`] after resolution completes and
/// never mutated afterwards; a new generation produces a new descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    id: AssetId,
    shape: Shape,
    color: HexColor,
    roughness: f64,
    metalness: f64,
    scale: Scale,
    name: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    texture: Option<TextureImage>,
}

impl AssetDescriptor {
    /// Merge resolved parameters with defaults and stamp a fresh id
    pub fn assemble(
        params: AssetParameters,
        prompt: &str,
        texture: Option<TextureImage>,
    ) -> Result<Self> {
        let descriptor = Self {
            id: AssetId::new(),
            shape: params.shape.unwrap_or(Shape::Box),
            color: params.color.unwrap_or_else(HexColor::white),
            roughness: unit_interval(params.roughness, DEFAULT_ROUGHNESS),
            metalness: unit_interval(params.metalness, DEFAULT_METALNESS),
            scale: params.scale.unwrap_or(Scale::ONE),
            name: params
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            description: prompt.to_string(),
            texture,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the invariants a consumer relies on. Descriptors loaded from
    /// disk go through this before use.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(ForgeError::AssemblyError(msg)) };

        if self.description.trim().is_empty() {
            return fail("description (source prompt) is empty".to_string());
        }
        if self.name.trim().is_empty() {
            return fail("name is empty".to_string());
        }
        for (field, value) in [("roughness", self.roughness), ("metalness", self.metalness)] {
            if !(0.0..=1.0).contains(&value) {
                return fail(format!("{} {} outside [0, 1]", field, value));
            }
        }
        if Scale::from_components(&self.scale.to_array()).is_none() {
            return fail(format!("scale {:?} is not positive", self.scale.to_array()));
        }
        if let Some(texture) = &self.texture {
            if texture.data.is_empty() || !texture.mime_type.starts_with("image/") {
                return fail(format!("texture payload '{}' is not an image", texture.mime_type));
            }
        }
        Ok(())
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn color(&self) -> &HexColor {
        &self.color
    }

    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    pub fn metalness(&self) -> f64 {
        self.metalness
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The verbatim prompt this asset was generated from
    pub fn description(&self) -> &str {
        &self.description
    }

    /// `None` means render with a flat material
    pub fn texture(&self) -> Option<&TextureImage> {
        self.texture.as_ref()
    }
}

/// Clamp into [0, 1]; absent or non-finite values take the default
fn unit_interval(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => default,
    }
}
