//! Material and spatial value types

use crate::error::ForgeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated `#rgb` or `#rrggbb` colour string.
///
/// The original spelling (case, short form) is preserved so a descriptor
/// echoes what the resolver returned.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#')?;
        if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(s.to_string()))
    }

    pub fn white() -> Self {
        Self("#ffffff".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = ForgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value).ok_or(ForgeError::InvalidValue {
            field: "color".to_string(),
            value,
        })
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-axis scale with exactly three strictly positive, finite components.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 3]")]
pub struct Scale {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Scale {
    pub const ONE: Self = Self {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    /// Build from a component list; `None` unless there are exactly three
    /// finite, positive entries.
    pub fn from_components(components: &[f64]) -> Option<Self> {
        match components {
            [x, y, z] if [x, y, z].iter().all(|v| v.is_finite() && **v > 0.0) => Some(Self {
                x: *x,
                y: *y,
                z: *z,
            }),
            _ => None,
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<Vec<f64>> for Scale {
    type Error = ForgeError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Scale::from_components(&value).ok_or_else(|| ForgeError::InvalidValue {
            field: "scale".to_string(),
            value: format!("{:?}", value),
        })
    }
}

impl From<Scale> for [f64; 3] {
    fn from(scale: Scale) -> Self {
        scale.to_array()
    }
}
