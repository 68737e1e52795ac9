//! Forge Gen - prompt-to-asset generation pipeline
//!
//! Turns a free-text prompt into a validated asset descriptor through a
//! structured-inference collaborator, optionally synthesizes a seamless
//! texture, maps detail levels to tessellation recipes, and gates exports
//! by account tier. Collaborators are pluggable (Gemini, offline mock).

pub mod account;
pub mod config;
pub mod descriptor;
pub mod entitlement;
pub mod export;
pub mod geometry;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod session;
pub mod texture;

pub use account::AccountStore;
pub use config::ForgeConfig;
pub use descriptor::{AssetDescriptor, AssetParameters, Shape, TextureImage};
pub use entitlement::{authorize, spend, upgrade, Account, Authorization, Tier};
pub use export::{export, ExportEncoder, ExportFormat, ExportOutcome, ExportedFile, ManifestEncoder};
pub use geometry::{parameterize, DetailLevel, RenderKey, Tessellation, TessellationRecipe};
pub use provider::{
    Deadline, ImageGeneration, ImageRequest, InferenceRequest, ProviderStatus, ResponsePart,
    StructuredInference,
};
pub use resolver::PromptResolver;
pub use session::{AssetSession, GenerationRequest, Preview, SessionState};
pub use texture::TextureSynthesizer;
