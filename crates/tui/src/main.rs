mod app;
mod view;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use moviedeck_core::{
    config::{self, AppConfig},
    FavoritesStore, LocalStorage, MovieClient,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(config = %config_path.display(), api = %config.api_base_url, "starting moviedeck");

    let storage = LocalStorage::open(&config.storage_path).with_context(|| {
        format!(
            "failed to open local storage {}",
            config.storage_path.display()
        )
    })?;
    let store = FavoritesStore::new(storage);
    let client = MovieClient::new(&config)?;

    let mut app = app::MovieDeckApp::new(&config, client, store)?;
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("moviedeck.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    // The terminal UI owns stdout, so events only go to the log file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
