//! Shared types, error model, and configuration for kbpress.
//!
//! This crate is the foundation depended on by all other kbpress crates.
//! It provides:
//! - [`PublishError`] — the unified error type
//! - Domain types ([`FaqDocument`], [`PromoDocument`], [`IndexDocument`], [`RegistryEntry`])
//! - Configuration ([`PublishConfig`], loaded from the environment)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ADMIN_TOKEN_VAR, OUTPUT_DIR_VAR, PublishConfig, REFRESH_URL_VAR, REGISTRY_URL_VAR,
};
pub use error::{PublishError, Result};
pub use types::{
    FaqDocument, FaqRow, IndexDocument, PromoDocument, PromoRow, RegistryEntry, SlugMeta, unix_now,
};
