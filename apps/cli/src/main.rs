//! kbpress CLI — static knowledge-base publisher for a multi-tenant chatbot.
//!
//! Reads a spreadsheet registry of locations, normalizes each location's
//! FAQ and promotion tables into JSON documents, and publishes them as a
//! static file tree with a top-level routing index.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
