//! Binary crate for the `weather-dash` terminal dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Terminal handling and the event loop
//! - Rendering the dashboard panels

use clap::Parser;

mod app;
mod cli;
mod configure;
mod logging;
mod show;
mod terminal;
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
