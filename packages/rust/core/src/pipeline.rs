//! End-to-end publish pipeline: registry → per-location documents → index.
//!
//! One run is a full rebuild: the output root is wiped, every registered
//! location's tables are fetched and normalized, the routing index is
//! written last, and the bot is nudged to reload. Failures on required
//! tables abort the run; the override merge and the refresh notification
//! degrade with a warning.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use url::Url;

use kbpress_normalize::{merge_overrides, normalize_faqs, normalize_promos};
use kbpress_publish::{notify_refresh, reset_dir, write_json};
use kbpress_shared::{
    IndexDocument, PromoDocument, PublishConfig, PublishError, RegistryEntry, Result, SlugMeta,
    unix_now,
};
use kbpress_tabular::{Table, TableFetcher, sheet_export_url_in, sheets_base};

use crate::registry::parse_registry;

/// Name of the top-level index document.
const INDEX_FILE: &str = "index.json";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Refresh endpoint plus the shared admin token.
#[derive(Debug, Clone)]
pub struct RefreshTarget {
    pub endpoint: String,
    pub token: String,
}

/// Runtime configuration for one publish run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// CSV export URL of the location registry.
    pub registry_url: Url,
    /// Root directory for the static output tree.
    pub output_root: PathBuf,
    /// Bot refresh target; `None` skips the notification step.
    pub refresh: Option<RefreshTarget>,
}

impl TryFrom<&PublishConfig> for BuildConfig {
    type Error = PublishError;

    fn try_from(config: &PublishConfig) -> Result<Self> {
        let registry_url = Url::parse(&config.registry_url).map_err(|e| {
            PublishError::config(format!(
                "invalid registry URL '{}': {e}",
                config.registry_url
            ))
        })?;

        Ok(Self {
            registry_url,
            output_root: config.output_dir.clone(),
            refresh: config
                .refresh_target()
                .map(|(endpoint, token)| RefreshTarget {
                    endpoint: endpoint.to_string(),
                    token: token.to_string(),
                }),
        })
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Result of a completed publish run.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Locations whose documents were written.
    pub locations_published: usize,
    /// Registry rows dropped for missing slug/id/dataset.
    pub locations_skipped: usize,
    /// Root of the written tree.
    pub output_root: PathBuf,
    /// Total duration of the run.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after a location's documents are written.
    fn location_published(&self, slug: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, summary: &BuildSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn location_published(&self, _slug: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &BuildSummary) {}
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// One location's contribution to the index, folded into the routing and
/// slug-metadata maps after every location has published.
struct LocationOutcome {
    slug: String,
    external_id: String,
    meta: SlugMeta,
}

/// Drives the full publish pipeline.
pub struct Publisher {
    fetcher: TableFetcher,
    sheet_base: Url,
}

impl Publisher {
    /// Create a publisher with the standard fetcher and export endpoint.
    pub fn new() -> Result<Self> {
        Ok(Self {
            fetcher: TableFetcher::new()?,
            sheet_base: sheets_base(),
        })
    }

    /// Build export URLs against a different endpoint (for tests against a
    /// mock server).
    #[cfg(test)]
    fn with_sheet_base(mut self, base: Url) -> Self {
        self.sheet_base = base;
        self
    }

    /// Run the full publish pipeline.
    ///
    /// 1. Destroy and recreate the output root
    /// 2. Fetch and parse the registry
    /// 3. Publish each location's documents, in registry order
    /// 4. Fold per-location outcomes into `index.json`
    /// 5. Best-effort bot refresh
    #[instrument(skip_all, fields(registry = %config.registry_url))]
    pub async fn run(
        &self,
        config: &BuildConfig,
        progress: &dyn ProgressReporter,
    ) -> Result<BuildSummary> {
        let start = Instant::now();

        progress.phase("Preparing output directory");
        reset_dir(&config.output_root)?;

        progress.phase("Loading registry");
        let registry = self.fetcher.fetch_table(&config.registry_url).await?;
        let entries = parse_registry(&registry)?;
        let locations_skipped = registry.row_count() - entries.len();

        info!(
            locations = entries.len(),
            skipped = locations_skipped,
            "registry loaded"
        );

        // Registry order is preserved end to end, so a duplicate external id
        // resolves to the last row that declared it.
        let total = entries.len();
        let mut outcomes = Vec::with_capacity(total);
        for (i, entry) in entries.iter().enumerate() {
            let outcome = self.publish_location(&config.output_root, entry).await?;
            progress.location_published(&entry.slug, i + 1, total);
            outcomes.push(outcome);
        }

        progress.phase("Writing index");
        let index = fold_index(outcomes);
        write_json(&config.output_root.join(INDEX_FILE), &index)?;

        if let Some(target) = &config.refresh {
            progress.phase("Notifying bot refresh");
            if let Err(e) = notify_refresh(&target.endpoint, &target.token).await {
                warn!(error = %e, "bot refresh not delivered");
            }
        }

        let summary = BuildSummary {
            locations_published: total,
            locations_skipped,
            output_root: config.output_root.clone(),
            elapsed: start.elapsed(),
        };

        progress.done(&summary);

        info!(
            locations_published = summary.locations_published,
            locations_skipped = summary.locations_skipped,
            elapsed_ms = summary.elapsed.as_millis(),
            "publish run complete"
        );

        Ok(summary)
    }

    /// Fetch, normalize, and write one location's documents.
    ///
    /// FAQ and promotion tables are required; any failure there aborts the
    /// whole run. The override merge is optional and degrades to the base
    /// promotion document.
    #[instrument(skip_all, fields(slug = %entry.slug))]
    async fn publish_location(
        &self,
        output_root: &std::path::Path,
        entry: &RegistryEntry,
    ) -> Result<LocationOutcome> {
        let faqs = normalize_faqs(&self.fetch_sheet(entry, &entry.faqs_table).await?)?;
        let mut promos = normalize_promos(&self.fetch_sheet(entry, &entry.promos_table).await?)?;

        if let Some(overrides_table) = &entry.overrides_table {
            match self.apply_overrides(entry, overrides_table, &promos).await {
                Ok(merged) => promos = merged,
                Err(e) => {
                    warn!(slug = %entry.slug, error = %e, "overrides not applied");
                }
            }
        }

        let slug_dir = output_root.join("slugs").join(&entry.slug);
        write_json(&slug_dir.join("faqs.json"), &faqs)?;
        write_json(&slug_dir.join("promos.json"), &promos)?;

        info!(
            faq_rows = faqs.rows.len(),
            promo_rows = promos.rows.len(),
            "location published"
        );

        Ok(LocationOutcome {
            slug: entry.slug.clone(),
            external_id: entry.external_id.clone(),
            meta: SlugMeta::for_slug(&entry.slug),
        })
    }

    /// Fetch the override table and layer it onto the base promotions.
    async fn apply_overrides(
        &self,
        entry: &RegistryEntry,
        overrides_table: &str,
        base: &PromoDocument,
    ) -> Result<PromoDocument> {
        let table = self.fetch_sheet(entry, overrides_table).await?;
        merge_overrides(base, &table, &entry.slug)
    }

    async fn fetch_sheet(&self, entry: &RegistryEntry, table_name: &str) -> Result<Table> {
        let url = sheet_export_url_in(&self.sheet_base, &entry.dataset_id, table_name);
        self.fetcher.fetch_table(&url).await
    }
}

/// Fold per-location outcomes into the index document.
///
/// Outcomes arrive in registry order, so inserting sequentially gives
/// last-row-wins semantics for duplicate external ids.
fn fold_index(outcomes: Vec<LocationOutcome>) -> IndexDocument {
    let mut routing = BTreeMap::new();
    let mut slugs = BTreeMap::new();

    for outcome in outcomes {
        routing.insert(outcome.external_id, outcome.slug.clone());
        slugs.insert(outcome.slug, outcome.meta);
    }

    IndexDocument {
        generated_at: unix_now(),
        routing,
        slugs,
    }
}
