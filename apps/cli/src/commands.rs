//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use kbpress_core::{BuildConfig, BuildSummary, ProgressReporter, Publisher, parse_registry};
use kbpress_shared::{
    ADMIN_TOKEN_VAR, OUTPUT_DIR_VAR, PublishConfig, REFRESH_URL_VAR, REGISTRY_URL_VAR,
};
use kbpress_tabular::TableFetcher;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// kbpress — publish spreadsheet-backed chatbot knowledge as static JSON.
#[derive(Parser)]
#[command(
    name = "kbpress",
    version,
    about = "Publish a spreadsheet-backed chatbot knowledge base as a static JSON tree.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Rebuild and publish the full static knowledge base.
    Build {
        /// Registry sheet CSV export URL.
        #[arg(long, env = REGISTRY_URL_VAR)]
        registry_url: Option<String>,

        /// Output directory for the static tree (defaults to `public`).
        #[arg(short, long, env = OUTPUT_DIR_VAR)]
        out: Option<String>,

        /// Bot refresh endpoint to notify after a successful build.
        #[arg(long, env = REFRESH_URL_VAR)]
        refresh_url: Option<String>,

        /// Shared admin token for the refresh endpoint.
        #[arg(long, env = ADMIN_TOKEN_VAR)]
        admin_token: Option<String>,
    },

    /// Fetch the registry and list the locations it resolves to, without
    /// publishing anything.
    Registry {
        /// Registry sheet CSV export URL.
        #[arg(long, env = REGISTRY_URL_VAR)]
        registry_url: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "kbpress=info",
        1 => "kbpress=debug",
        _ => "kbpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            registry_url,
            out,
            refresh_url,
            admin_token,
        } => cmd_build(registry_url, out, refresh_url, admin_token).await,
        Command::Registry { registry_url } => cmd_registry(registry_url).await,
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

async fn cmd_build(
    registry_url: Option<String>,
    out: Option<String>,
    refresh_url: Option<String>,
    admin_token: Option<String>,
) -> Result<()> {
    // Flags already carry their env fallbacks (clap `env`); feed them
    // through the shared config loader so required-value errors are
    // reported uniformly.
    let config = PublishConfig::from_lookup(|name| match name {
        REGISTRY_URL_VAR => registry_url.clone(),
        OUTPUT_DIR_VAR => out.clone(),
        REFRESH_URL_VAR => refresh_url.clone(),
        ADMIN_TOKEN_VAR => admin_token.clone(),
        _ => None,
    })?;

    let build_config = BuildConfig::try_from(&config)?;

    info!(
        registry = %build_config.registry_url,
        out = %build_config.output_root.display(),
        notify = build_config.refresh.is_some(),
        "starting publish run"
    );

    let reporter = CliProgress::new();
    let summary = Publisher::new()?.run(&build_config, &reporter).await?;

    println!();
    println!("  Knowledge base published!");
    println!("  Locations: {}", summary.locations_published);
    if summary.locations_skipped > 0 {
        println!("  Skipped:   {}", summary.locations_skipped);
    }
    println!("  Output:    {}", summary.output_root.display());
    println!("  Time:      {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// registry
// ---------------------------------------------------------------------------

async fn cmd_registry(registry_url: Option<String>) -> Result<()> {
    let config = PublishConfig::from_lookup(|name| match name {
        REGISTRY_URL_VAR => registry_url.clone(),
        _ => None,
    })?;
    let url = Url::parse(&config.registry_url)?;

    let table = TableFetcher::new()?.fetch_table(&url).await?;
    let entries = parse_registry(&table)?;
    let skipped = table.row_count() - entries.len();

    println!();
    println!("  {} location(s) registered", entries.len());
    for entry in &entries {
        let overrides = entry.overrides_table.as_deref().unwrap_or("-");
        println!(
            "  {:<20} wa_id={:<16} dataset={} tables={}/{} overrides={}",
            entry.slug,
            entry.external_id,
            entry.dataset_id,
            entry.faqs_table,
            entry.promos_table,
            overrides,
        );
    }
    if skipped > 0 {
        println!("  {skipped} row(s) skipped (blank slug, wa_id, or doc_id)");
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn location_published(&self, slug: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Publishing [{current}/{total}] {slug}"));
    }

    fn done(&self, _summary: &BuildSummary) {
        self.spinner.finish_and_clear();
    }
}
