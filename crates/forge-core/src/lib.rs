//! Forge Core - Foundational types for the Forge asset pipeline
//!
//! This crate provides the core types that all other Forge crates depend on:
//! - `AssetId` - Locally generated, never-reused asset identifiers
//! - `ContentHash` - SHA-256 based content hashing
//! - `HexColor`, `Scale` - Material and spatial value types
//! - Error types and Result alias

mod error;
mod hash;
mod id;
mod types;

pub use error::{ForgeError, Result};
pub use hash::ContentHash;
pub use id::AssetId;
pub use types::{HexColor, Scale};
