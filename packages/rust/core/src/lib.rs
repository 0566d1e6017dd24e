//! Core pipeline orchestration for kbpress.
//!
//! This crate ties together fetching, normalization, and publication into
//! the end-to-end publish run driven by the CLI:
//! - [`registry`] — location registry parsing
//! - [`pipeline`] — the [`pipeline::Publisher`] build loop

pub mod pipeline;
pub mod registry;

pub use pipeline::{
    BuildConfig, BuildSummary, ProgressReporter, Publisher, RefreshTarget, SilentProgress,
};
pub use registry::{REGISTRY_SCHEMA, parse_registry};
