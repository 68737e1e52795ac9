//! Detail level to tessellation parameters
//!
//! A detail level maps to a single segment count, and each shape family
//! derives its own tessellation arguments from that count. The per-shape
//! derivation must stay exactly as written here so every renderer produces
//! the same mesh density for the same detail level.

use crate::descriptor::Shape;
use forge_core::AssetId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Segment count used for unrecognized detail labels
pub const DEFAULT_SEGMENT_COUNT: u32 = 32;

/// Dodecahedra get one subdivision once the segment count exceeds this
const DODECAHEDRON_SUBDIVIDE_ABOVE: u32 = 12;

/// User-facing mesh density
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 3] = [DetailLevel::Low, DetailLevel::Medium, DetailLevel::High];
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailLevel::Low => write!(f, "Low"),
            DetailLevel::Medium => write!(f, "Medium"),
            DetailLevel::High => write!(f, "High"),
        }
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(DetailLevel::Low),
            "medium" => Ok(DetailLevel::Medium),
            "high" => Ok(DetailLevel::High),
            _ => Err(format!(
                "unknown detail level '{}'; valid values: low, medium, high",
                s
            )),
        }
    }
}

/// Segment count for a detail level
pub fn parameterize(level: DetailLevel) -> u32 {
    match level {
        DetailLevel::Low => 12,
        DetailLevel::Medium => 32,
        DetailLevel::High => 128,
    }
}

/// Segment count for a free-form detail label, falling back to
/// [`DEFAULT_SEGMENT_COUNT`] when the label is not a known level
pub fn parameterize_label(label: &str) -> u32 {
    label
        .parse::<DetailLevel>()
        .map(parameterize)
        .unwrap_or(DEFAULT_SEGMENT_COUNT)
}

/// Concrete geometry arguments for one shape family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Tessellation {
    Box {
        width: f64,
        height: f64,
        depth: f64,
        width_segments: u32,
        height_segments: u32,
        depth_segments: u32,
    },
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        radial_segments: u32,
    },
    Torus {
        radius: f64,
        tube: f64,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Cone {
        radius: f64,
        height: f64,
        radial_segments: u32,
    },
    Capsule {
        radius: f64,
        length: f64,
        cap_segments: u32,
        radial_segments: u32,
    },
    Dodecahedron {
        radius: f64,
        detail: u32,
    },
}

/// Derive the tessellation for `shape` at `segments`
pub fn tessellate(shape: Shape, segments: u32) -> Tessellation {
    match shape {
        Shape::Box => Tessellation::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            width_segments: segments / 4,
            height_segments: segments / 4,
            depth_segments: segments / 4,
        },
        Shape::Sphere => Tessellation::Sphere {
            radius: 0.7,
            width_segments: segments,
            height_segments: segments,
        },
        Shape::Cylinder => Tessellation::Cylinder {
            radius_top: 0.5,
            radius_bottom: 0.5,
            height: 1.0,
            radial_segments: segments,
        },
        Shape::Torus => Tessellation::Torus {
            radius: 0.6,
            tube: 0.2,
            radial_segments: segments,
            tubular_segments: segments,
        },
        Shape::Cone => Tessellation::Cone {
            radius: 0.6,
            height: 1.2,
            radial_segments: segments,
        },
        Shape::Capsule => Tessellation::Capsule {
            radius: 0.5,
            length: 1.0,
            cap_segments: 4,
            radial_segments: segments,
        },
        Shape::Dodecahedron => Tessellation::Dodecahedron {
            radius: 0.7,
            detail: if segments > DODECAHEDRON_SUBDIVIDE_ABOVE { 1 } else { 0 },
        },
    }
}

/// Everything a renderer needs to build the mesh for one shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TessellationRecipe {
    pub shape: Shape,
    pub detail: DetailLevel,
    pub segment_count: u32,
    pub tessellation: Tessellation,
}

impl TessellationRecipe {
    pub fn new(shape: Shape, detail: DetailLevel) -> Self {
        let segment_count = parameterize(detail);
        Self {
            shape,
            detail,
            segment_count,
            tessellation: tessellate(shape, segment_count),
        }
    }
}

/// Identifies a rendered frame's inputs. The renderer re-renders whenever
/// this changes, i.e. on a new asset id or a new detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub asset_id: AssetId,
    pub detail: DetailLevel,
}

impl RenderKey {
    pub fn needs_rerender(previous: Option<&RenderKey>, next: &RenderKey) -> bool {
        previous != Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameterize_levels() {
        assert_eq!(parameterize(DetailLevel::Low), 12);
        assert_eq!(parameterize(DetailLevel::Medium), 32);
        assert_eq!(parameterize(DetailLevel::High), 128);
    }

    #[test]
    fn test_parameterize_label_defaults() {
        assert_eq!(parameterize_label("Low"), 12);
        assert_eq!(parameterize_label("HIGH"), 128);
        assert_eq!(parameterize_label("ultra"), DEFAULT_SEGMENT_COUNT);
        assert_eq!(parameterize_label(""), 32);
    }

    #[test]
    fn test_box_divides_segments_by_four() {
        let expected = [(DetailLevel::Low, 3), (DetailLevel::Medium, 8), (DetailLevel::High, 32)];
        for (level, per_axis) in expected {
            match tessellate(Shape::Box, parameterize(level)) {
                Tessellation::Box {
                    width_segments,
                    height_segments,
                    depth_segments,
                    ..
                } => {
                    assert_eq!(width_segments, per_axis);
                    assert_eq!(height_segments, per_axis);
                    assert_eq!(depth_segments, per_axis);
                }
                other => panic!("expected box, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_radial_shapes_use_segment_count() {
        assert_eq!(
            tessellate(Shape::Cylinder, 32),
            Tessellation::Cylinder {
                radius_top: 0.5,
                radius_bottom: 0.5,
                height: 1.0,
                radial_segments: 32,
            }
        );
        assert_eq!(
            tessellate(Shape::Torus, 128),
            Tessellation::Torus {
                radius: 0.6,
                tube: 0.2,
                radial_segments: 128,
                tubular_segments: 128,
            }
        );
        assert_eq!(
            tessellate(Shape::Capsule, 12),
            Tessellation::Capsule {
                radius: 0.5,
                length: 1.0,
                cap_segments: 4,
                radial_segments: 12,
            }
        );
    }

    #[test]
    fn test_dodecahedron_detail_flag() {
        let detail_at = |level| match tessellate(Shape::Dodecahedron, parameterize(level)) {
            Tessellation::Dodecahedron { detail, .. } => detail,
            other => panic!("expected dodecahedron, got {:?}", other),
        };
        assert_eq!(detail_at(DetailLevel::Low), 0);
        assert_eq!(detail_at(DetailLevel::Medium), 1);
        assert_eq!(detail_at(DetailLevel::High), 1);
    }

    #[test]
    fn test_recipe_for_every_shape() {
        for shape in Shape::ALL {
            let recipe = TessellationRecipe::new(shape, DetailLevel::Medium);
            assert_eq!(recipe.segment_count, 32);
            assert_eq!(recipe.tessellation, tessellate(shape, 32));
        }
    }

    #[test]
    fn test_detail_level_parsing() {
        assert_eq!("medium".parse::<DetailLevel>(), Ok(DetailLevel::Medium));
        assert_eq!(" Low ".parse::<DetailLevel>(), Ok(DetailLevel::Low));
        assert!("extreme".parse::<DetailLevel>().is_err());
        assert_eq!(DetailLevel::High.to_string(), "High");
    }

    #[test]
    fn test_render_key_changes() {
        let id = AssetId::new();
        let medium = RenderKey { asset_id: id, detail: DetailLevel::Medium };
        let high = RenderKey { asset_id: id, detail: DetailLevel::High };
        let other = RenderKey { asset_id: AssetId::new(), detail: DetailLevel::Medium };

        assert!(RenderKey::needs_rerender(None, &medium));
        assert!(!RenderKey::needs_rerender(Some(&medium), &medium));
        assert!(RenderKey::needs_rerender(Some(&medium), &high));
        assert!(RenderKey::needs_rerender(Some(&medium), &other));
    }
}
