use anyhow::Context;
use std::{fs::File, path::PathBuf, sync::Mutex};
use tracing_subscriber::EnvFilter;
use weather_core::Config;

const LOG_FILE: &str = "weather-dash.log";

fn filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }))
}

/// Log to stderr, for commands that do not take over the terminal.
pub fn init_stderr(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to a file in the data directory; the dashboard owns the terminal.
pub fn init_file(debug: bool) -> anyhow::Result<PathBuf> {
    let dir = Config::project_dirs()?.data_local_dir().to_path_buf();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let path = dir.join(LOG_FILE);
    let file = File::create(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();

    tracing::info!(path = %path.display(), "logging to file");
    Ok(path)
}
