//! Recipe command

use anyhow::Result;
use forge_gen::{DetailLevel, Shape, TessellationRecipe};

pub fn run(shape: Shape, detail: DetailLevel, format: &str) -> Result<()> {
    let recipe = TessellationRecipe::new(shape, detail);
    println!("{}", render(&recipe, format)?);
    Ok(())
}

fn render(recipe: &TessellationRecipe, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(recipe)?),
        "toml" => Ok(toml::to_string_pretty(recipe)?),
        _ => anyhow::bail!("Unknown format '{}'. Use: json, toml", format),
    }
}
