//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tutorbook::adapters::persistence::{MemoryStore, SqliteStore};
use tutorbook::adapters::realtime::ChannelFeed;
use tutorbook::adapters::ui::TuiInputPort;
use tutorbook::ports::{BookingStore, InputPort, RealtimeFeed};
use tutorbook::shared::config::AppConfig;
use tutorbook::usecases::{BookingService, ScheduleService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = &env_loaded {
        info!(path = %path.display(), "loaded .env");
    }

    tutorbook::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_default();

    // --- Realtime hub: stores publish created bookings, sessions subscribe ---
    let feed = Arc::new(ChannelFeed::new(cfg.event_capacity_or_default()));
    let publisher = feed.publisher();

    // --- Persistence: SQLite by default, in-memory demo mode on request ---
    let store: Arc<dyn BookingStore> = if cfg.in_memory_or_default() {
        info!("TUTORBOOK_IN_MEMORY set; using in-memory store with demo data");
        let memory = MemoryStore::new(Some(publisher));
        memory.seed_demo().await;
        Arc::new(memory)
    } else {
        let data_dir = PathBuf::from(cfg.data_dir_or_default());
        info!(path = %data_dir.display(), "data directory");
        let sqlite = SqliteStore::connect(&data_dir, Some(publisher))
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?;
        sqlite
            .seed_demo()
            .await
            .map_err(|e| anyhow::anyhow!("demo seed failed: {}", e))?;
        Arc::new(sqlite)
    };

    // --- Services ---
    let schedule = Arc::new(ScheduleService::new(Arc::clone(&store)));
    let bookings = Arc::new(BookingService::new(Arc::clone(&store)));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::clone(&store),
        Arc::clone(&feed) as Arc<dyn RealtimeFeed>,
        schedule,
        bookings,
        cfg.preselected_tutor(),
    ));

    // --- Run (tutor selection -> slot toggling -> submission) ---
    input_port.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
