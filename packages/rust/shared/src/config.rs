//! Environment-provided configuration for a publish run.
//!
//! kbpress is driven by an external scheduler (cron, CI job), so all
//! configuration arrives through the environment. CLI flags override
//! environment values at the app layer.

use std::path::PathBuf;

use crate::error::{PublishError, Result};

/// Env var holding the registry CSV export URL. Required.
pub const REGISTRY_URL_VAR: &str = "REGISTRY_SHEET_CSV";

/// Env var overriding the output root directory. Optional.
pub const OUTPUT_DIR_VAR: &str = "KBPRESS_OUTPUT_DIR";

/// Env var holding the bot refresh endpoint. Optional.
pub const REFRESH_URL_VAR: &str = "BOT_REFRESH_URL";

/// Env var holding the shared admin token for the refresh endpoint. Optional.
pub const ADMIN_TOKEN_VAR: &str = "ADMIN_TOKEN";

/// Default output root when [`OUTPUT_DIR_VAR`] is unset.
const DEFAULT_OUTPUT_DIR: &str = "public";

/// Resolved configuration for one publish run.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// CSV export URL of the location registry.
    pub registry_url: String,
    /// Root directory the static tree is written to. Destroyed and
    /// recreated on every run.
    pub output_dir: PathBuf,
    /// Bot refresh endpoint, if configured.
    pub refresh_url: Option<String>,
    /// Shared admin token for the refresh endpoint, if configured.
    pub admin_token: Option<String>,
}

impl PublishConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a lookup closure.
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let registry_url = non_blank(REGISTRY_URL_VAR).ok_or_else(|| {
            PublishError::config(format!(
                "{REGISTRY_URL_VAR} is not set. Point it at the registry sheet's CSV export URL."
            ))
        })?;

        let output_dir = non_blank(OUTPUT_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                tracing::debug!("{OUTPUT_DIR_VAR} not set, using {DEFAULT_OUTPUT_DIR:?}");
                PathBuf::from(DEFAULT_OUTPUT_DIR)
            });

        Ok(Self {
            registry_url,
            output_dir,
            refresh_url: non_blank(REFRESH_URL_VAR),
            admin_token: non_blank(ADMIN_TOKEN_VAR),
        })
    }

    /// The refresh endpoint and token, when both are configured.
    ///
    /// The notification step is skipped entirely unless both are present.
    pub fn refresh_target(&self) -> Option<(&str, &str)> {
        match (self.refresh_url.as_deref(), self.admin_token.as_deref()) {
            (Some(url), Some(token)) => Some((url, token)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn registry_url_is_required() {
        let result = PublishConfig::from_lookup(|_| None);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains(REGISTRY_URL_VAR)
        );
    }

    #[test]
    fn defaults_applied() {
        let config = PublishConfig::from_lookup(lookup_from(&[(
            REGISTRY_URL_VAR,
            "https://example.com/registry.csv",
        )]))
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert!(config.refresh_url.is_none());
        assert!(config.refresh_target().is_none());
    }

    #[test]
    fn blank_values_treated_as_unset() {
        let result = PublishConfig::from_lookup(lookup_from(&[(REGISTRY_URL_VAR, "   ")]));
        assert!(result.is_err());
    }

    #[test]
    fn refresh_target_requires_both_url_and_token() {
        let partial = PublishConfig::from_lookup(lookup_from(&[
            (REGISTRY_URL_VAR, "https://example.com/registry.csv"),
            (REFRESH_URL_VAR, "https://bot.example.com/admin/refresh-all"),
        ]))
        .unwrap();
        assert!(partial.refresh_target().is_none());

        let full = PublishConfig::from_lookup(lookup_from(&[
            (REGISTRY_URL_VAR, "https://example.com/registry.csv"),
            (REFRESH_URL_VAR, "https://bot.example.com/admin/refresh-all"),
            (ADMIN_TOKEN_VAR, "s3cret"),
        ]))
        .unwrap();
        assert_eq!(
            full.refresh_target(),
            Some(("https://bot.example.com/admin/refresh-all", "s3cret"))
        );
    }
}
