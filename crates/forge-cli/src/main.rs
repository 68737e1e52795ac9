//! Forge CLI - Command-line interface for prompt-to-asset generation

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{account, export, generate, providers, recipe};
use forge_gen::{DetailLevel, ExportFormat, Shape};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Turn text prompts into parametric 3D asset descriptors", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an asset descriptor from a prompt
    Generate {
        /// Free-text description (e.g., "a rusty barrel")
        prompt: String,

        /// Mesh density (low, medium, high); defaults to the configured level
        #[arg(long)]
        detail: Option<DetailLevel>,

        /// Synthesize a texture even if the config disables it
        #[arg(long, conflicts_with = "no_texture")]
        texture: bool,

        /// Skip texture synthesis
        #[arg(long)]
        no_texture: bool,

        /// Collaborator to use (defaults to the configured provider)
        #[arg(long)]
        provider: Option<String>,

        /// Where to write the descriptor JSON
        #[arg(short, long, default_value = "asset.json")]
        output: String,

        /// Request timeout in seconds (0 disables)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Export a generated asset
    Export {
        /// Path to a descriptor JSON written by `forge generate`
        asset: String,

        /// Export format (glb, obj, fbx)
        #[arg(long)]
        format: ExportFormat,

        /// Mesh density (low, medium, high)
        #[arg(long, default_value = "medium")]
        detail: DetailLevel,

        /// Output directory
        #[arg(short, long, default_value = ".forge/exports")]
        output: String,
    },

    /// Account operations
    #[command(subcommand)]
    Account(account::AccountCommands),

    /// Print the tessellation recipe for a shape
    Recipe {
        /// Shape family (box, sphere, cylinder, torus, cone, capsule, dodecahedron)
        shape: Shape,

        /// Mesh density (low, medium, high)
        #[arg(long, default_value = "medium")]
        detail: DetailLevel,

        /// Output format (json or toml)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// List collaborators and their health
    Providers,
}

/// `--texture` / `--no-texture` as an override of the configured default
fn texture_override(texture: bool, no_texture: bool) -> Option<bool> {
    match (texture, no_texture) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            prompt,
            detail,
            texture,
            no_texture,
            provider,
            output,
            timeout,
        } => generate::run(generate::GenerateArgs {
            prompt,
            detail,
            texture: texture_override(texture, no_texture),
            provider,
            output,
            timeout,
        }),
        Commands::Export {
            asset,
            format,
            detail,
            output,
        } => export::run(&asset, format, detail, &output),
        Commands::Account(cmd) => account::run(cmd),
        Commands::Recipe {
            shape,
            detail,
            format,
        } => recipe::run(shape, detail, &format),
        Commands::Providers => providers::run(),
    }
}
