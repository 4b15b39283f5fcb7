use anyhow::Context;
use chrono::FixedOffset;
use std::sync::Arc;
use tracing::info;

use queimadas_alerts::config::AppConfig;
use queimadas_alerts::http;
use queimadas_alerts::notify::{LogNotifier, Notifier, SmtpNotifier};
use queimadas_alerts::processor::AlertProcessor;
use queimadas_alerts::store::{InMemoryRowStore, PgRowStore, RowStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Queimadas Alerts Service...");

    let reference_offset = FixedOffset::east_opt(config.tz_offset_hours * 3600)
        .context("TZ_OFFSET_HOURS out of range")?;

    let store: Arc<dyn RowStore> = match config.store_backend.as_str() {
        "memory" => {
            info!("Using in-memory row store (dev mode, data is not persisted)");
            Arc::new(InMemoryRowStore::seeded(&config.layout))
        }
        _ => {
            let store = PgRowStore::connect(&config.database_url).await?;
            store.ensure_schema(&config.layout).await?;
            info!("Connected to database");
            Arc::new(store)
        }
    };

    let notifier: Arc<dyn Notifier> = match config.notifier_backend.as_str() {
        "log" => Arc::new(LogNotifier),
        _ => Arc::new(SmtpNotifier::new(
            &config.smtp_host,
            config.smtp_port,
            &config.smtp_username,
            &config.smtp_password,
            &config.smtp_from,
        )?),
    };

    let processor = Arc::new(AlertProcessor::new(
        store,
        notifier,
        config.layout.clone(),
        reference_offset,
    ));

    let app = http::router(http::AppState {
        processor,
        store_backend: config.store_backend.clone(),
        notifier_backend: config.notifier_backend.clone(),
    });

    let addr = format!("{}:{}", config.http_host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
