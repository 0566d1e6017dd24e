//! Output publication for kbpress.
//!
//! This crate provides:
//! - [`writer`] — destructive-rebuild static tree writer
//! - [`notify`] — best-effort bot refresh notification

pub mod notify;
pub mod writer;

pub use notify::notify_refresh;
pub use writer::{reset_dir, write_json};
