use std::error::Error;

use bookshelf::config::LogConfig;
use bookshelf::{ServiceConfig, serve, store};
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = ServiceConfig::load()?;
    init_tracing(&config.log);

    let store = store::open(&config.store)?;
    tracing::info!(backend = ?config.store.backend, "store ready");

    serve(&config, store).await?;
    Ok(())
}
