//! Entitlement-gated export
//!
//! The pipeline decides whether an export may happen and hands the descriptor
//! and its tessellation recipe to an [`ExportEncoder`]. Producing GLB/OBJ/FBX
//! bitstreams is the encoder's job.

use crate::descriptor::AssetDescriptor;
use crate::entitlement::{authorize, Account, Authorization};
use crate::geometry::TessellationRecipe;
use forge_core::{ContentHash, ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Export file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Glb,
    Obj,
    Fbx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Glb, ExportFormat::Obj, ExportFormat::Fbx];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Glb => "glb",
            ExportFormat::Obj => "obj",
            ExportFormat::Fbx => "fbx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "glb" => Ok(ExportFormat::Glb),
            "obj" => Ok(ExportFormat::Obj),
            "fbx" => Ok(ExportFormat::Fbx),
            _ => Err(format!("unknown export format '{}'; valid values: glb, obj, fbx", s)),
        }
    }
}

/// External encoder contract. Only invoked after authorization succeeds.
pub trait ExportEncoder {
    fn encode(
        &mut self,
        descriptor: &AssetDescriptor,
        recipe: &TessellationRecipe,
        format: ExportFormat,
    ) -> Result<Vec<u8>>;
}

/// A successfully encoded export
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub content_hash: ContentHash,
}

#[derive(Debug, Clone)]
pub enum ExportOutcome {
    Exported(ExportedFile),
    /// The account's tier does not include this format
    UpgradeRequired { format: ExportFormat },
}

/// File name for an export: whitespace runs become `_`, lowercased
pub fn export_file_name(descriptor: &AssetDescriptor, format: ExportFormat) -> String {
    let stem = descriptor
        .name()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    format!("{}.{}", stem, format.extension())
}

/// Authorize and, when allowed, encode. Never touches credits.
pub fn export(
    descriptor: &AssetDescriptor,
    recipe: &TessellationRecipe,
    format: ExportFormat,
    account: &Account,
    encoder: &mut dyn ExportEncoder,
) -> Result<ExportOutcome> {
    if authorize(format, account) == Authorization::Denied {
        tracing::info!(%format, tier = ?account.tier, "export requires upgrade");
        return Ok(ExportOutcome::UpgradeRequired { format });
    }

    let bytes = encoder.encode(descriptor, recipe, format)?;
    if bytes.is_empty() {
        return Err(ForgeError::ExportError(format!(
            "encoder produced no bytes for {}",
            format
        )));
    }

    let file_name = export_file_name(descriptor, format);
    tracing::info!(%file_name, size = bytes.len(), "exported asset");
    Ok(ExportOutcome::Exported(ExportedFile {
        content_hash: ContentHash::of(&bytes),
        file_name,
        format,
        bytes,
    }))
}

/// Encodes a TOML export manifest describing what a binary encoder should
/// build. Lets the CLI hand exports off to an out-of-process encoder.
#[derive(Debug, Default)]
pub struct ManifestEncoder;

#[derive(Serialize)]
struct ExportManifest<'a> {
    format: ExportFormat,
    target: String,
    asset: &'a AssetDescriptor,
    recipe: &'a TessellationRecipe,
}

impl ExportEncoder for ManifestEncoder {
    fn encode(
        &mut self,
        descriptor: &AssetDescriptor,
        recipe: &TessellationRecipe,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        let manifest = ExportManifest {
            format,
            target: export_file_name(descriptor, format),
            asset: descriptor,
            recipe,
        };
        Ok(toml::to_string_pretty(&manifest)?.into_bytes())
    }
}
