use std::sync::Arc;

use crate::{config::Config, events::EventHub};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use linkstash_core::bookmarks::{BookmarkService, BookmarkServiceTrait};
use linkstash_storage_sqlite::bookmarks::BookmarkRepository;
use linkstash_storage_sqlite::db::{self, write_actor};

pub struct AppState {
    pub bookmark_service: Arc<dyn BookmarkServiceTrait + Send + Sync>,
    pub event_hub: EventHub,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let bookmark_repository = Arc::new(BookmarkRepository::new(pool, writer));

    // The hub is both the connection registry for the SSE push channel and
    // the event sink the service emits into after each mutation.
    let event_hub = EventHub::new();
    let bookmark_service: Arc<dyn BookmarkServiceTrait + Send + Sync> = Arc::new(
        BookmarkService::new(bookmark_repository).with_event_sink(Arc::new(event_hub.clone())),
    );

    Ok(Arc::new(AppState {
        bookmark_service,
        event_hub,
    }))
}
