//! Nursery Timers - persistent session timers for infant care tracking
//!
//! This is the main entry point for the nursery-timers daemon.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use nursery_timers::{
    api::create_router,
    clock::SystemClock,
    config::Config,
    records::JsonlRecordStore,
    state::AppState,
    store::{FileStore, KeyValueStore},
    tasks::{slot_tick_task, store_flush_task},
    timers::IntervalCadence,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "nursery_timers={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting nursery-timers v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, state={:?}, tick={}ms",
        config.host, config.port, config.state_file, config.tick_ms
    );

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.state_file));
    let records = Arc::new(JsonlRecordStore::new(&config.records_file));
    let (cadence, ticks) = IntervalCadence::new(config.tick_period());

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        Arc::clone(&store),
        records,
        Arc::new(SystemClock),
        Arc::new(cadence),
    ));

    // Start applying ticks before recovery re-attaches running timers
    tokio::spawn(slot_tick_task(Arc::clone(&state), ticks));
    tokio::spawn(store_flush_task(Arc::clone(&store), config.flush_period()));

    let report = state.foreground().map_err(anyhow::Error::msg)?;
    info!(
        "Startup recovery: resumed={:?} restored={:?}",
        report.resumed, report.restored
    );

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timers                  - List all timers");
    info!("  POST /timers/:slot/start      - Start or resume a timer");
    info!("  POST /timers/:slot/stop       - Pause a timer");
    info!("  POST /timers/:slot/reset      - Reset a timer");
    info!("  POST /timers/:slot/manual     - Enter a duration by hand");
    info!("  POST /timers/:slot/edit       - Load a saved record for editing");
    info!("  POST /timers/:slot/save       - Commit the timer as a record");
    info!("  POST /lifecycle/background    - Save teardown snapshot");
    info!("  POST /lifecycle/foreground    - Recover timers");
    info!("  GET  /status                  - Current status");
    info!("  GET  /health                  - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    match state.shutdown() {
        Ok(saved) => info!("Saved {} timers before exit", saved),
        Err(e) => tracing::error!("Failed to save timers before exit: {}", e),
    }

    info!("Server shutdown complete");
    Ok(())
}
