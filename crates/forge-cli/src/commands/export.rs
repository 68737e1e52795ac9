//! Export command

use anyhow::{Context, Result};
use forge_gen::{
    export, AccountStore, AssetDescriptor, DetailLevel, ExportFormat, ExportOutcome, ForgeConfig,
    ManifestEncoder, TessellationRecipe,
};
use std::path::{Path, PathBuf};

pub fn run(asset_path: &str, format: ExportFormat, detail: DetailLevel, output_dir: &str) -> Result<()> {
    let descriptor = load_descriptor(Path::new(asset_path))?;
    let config = ForgeConfig::load()?;
    let account = AccountStore::default_store().load_or(config.initial_account())?;
    let recipe = TessellationRecipe::new(descriptor.shape(), detail);

    let mut encoder = ManifestEncoder;
    match export(&descriptor, &recipe, format, &account, &mut encoder)? {
        ExportOutcome::Exported(file) => {
            let path = write_export(Path::new(output_dir), &file.file_name, &file.bytes)?;
            println!("Exported '{}' as {}", descriptor.name(), file.format);
            println!("  Manifest: {}", path.display());
            println!("  Target: {}", file.file_name);
            println!("  Detail: {} ({} segments)", recipe.detail, recipe.segment_count);
            println!("  Hash: {}", file.content_hash.to_prefixed_hex());
        }
        ExportOutcome::UpgradeRequired { format } => {
            println!(
                "{} export is not included in the {}.",
                format, account.tier
            );
            println!("  Run `forge account upgrade` to unlock OBJ and FBX, or export as GLB.");
        }
    }
    Ok(())
}

/// Read a descriptor and re-check it, since the file may have been edited
pub fn load_descriptor(path: &Path) -> Result<AssetDescriptor> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let descriptor: AssetDescriptor = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse asset descriptor {}", path.display()))?;
    descriptor.validate()?;
    Ok(descriptor)
}

fn write_export(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.toml", file_name));
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_gen::{AssetParameters, Shape};

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("forge_cli_export_test_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_load_descriptor_round_trip() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let params = AssetParameters {
            shape: Some(Shape::Torus),
            ..Default::default()
        };
        let descriptor = AssetDescriptor::assemble(params, "a donut", None).unwrap();
        let path = dir.join("asset.json");
        std::fs::write(&path, serde_json::to_string_pretty(&descriptor).unwrap()).unwrap();

        let loaded = load_descriptor(&path).unwrap();
        assert_eq!(loaded, descriptor);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_descriptor_rejects_out_of_range() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let descriptor = AssetDescriptor::assemble(AssetParameters::default(), "a crate", None).unwrap();
        let mut json = serde_json::to_value(&descriptor).unwrap();
        json["roughness"] = serde_json::json!(3.5);
        let path = dir.join("asset.json");
        std::fs::write(&path, json.to_string()).unwrap();

        assert!(load_descriptor(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_export_appends_manifest_extension() {
        let dir = temp_dir();
        let path = write_export(&dir, "rusty_barrel.glb", b"format = \"glb\"\n").unwrap();
        assert!(path.ends_with("rusty_barrel.glb.toml"));
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
