use std::sync::Arc;
use std::time::Duration;

use flight_assist::alerts::NotificationSink;
use flight_assist::config::{AppConfig, SearchConfig};
use flight_assist::contacts::ContactStore;
use flight_assist::gateway::ConversationalGateway;
use flight_assist::routes::{AppState, api_routes};
use flight_assist::search::provider::{FlightProvider, HttpProvider};
use flight_assist::search::store::{TaskStore, spawn_sweep_task};
use flight_assist::search::strategy::RouteBook;
use flight_assist::search::SearchOrchestrator;
use flight_assist::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut config = AppConfig::default();
    if let Ok(addr) = std::env::var("FLIGHT_ASSIST_BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(path) = std::env::var("FLIGHT_ASSIST_DB_PATH") {
        config.db_path = path;
    }
    config.search = SearchConfig {
        task_budget: env_duration_secs("FLIGHT_ASSIST_TASK_BUDGET_SECS", 45),
        provider_timeout: env_duration_secs("FLIGHT_ASSIST_PROVIDER_TIMEOUT_SECS", 30),
        task_ttl: env_duration_secs("FLIGHT_ASSIST_TASK_TTL_SECS", 30 * 60),
        ..SearchConfig::default()
    };

    eprintln!("✈️  Flight Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}", config.bind_addr);
    eprintln!("   Database: {}", config.db_path);

    // ── Database ─────────────────────────────────────────────────────────
    let db_path = std::path::Path::new(&config.db_path);
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(db_path).await.unwrap_or_else(
        |e| {
            eprintln!("Error: Failed to open database at {}: {}", config.db_path, e);
            std::process::exit(1);
        },
    ));

    // ── Providers ────────────────────────────────────────────────────────
    // FLIGHT_ASSIST_PROVIDERS is a comma-separated list of name=base_url
    // pairs; FLIGHT_ASSIST_PROVIDER_KEY_<NAME> supplies a bearer token.
    let mut providers: Vec<Arc<dyn FlightProvider>> = Vec::new();
    if let Ok(configured) = std::env::var("FLIGHT_ASSIST_PROVIDERS") {
        for entry in configured.split(',').filter(|s| !s.trim().is_empty()) {
            let Some((name, base_url)) = entry.trim().split_once('=') else {
                eprintln!("   Warning: ignoring malformed provider entry {entry:?}");
                continue;
            };
            let key_var = format!("FLIGHT_ASSIST_PROVIDER_KEY_{}", name.to_uppercase());
            let api_key = std::env::var(key_var)
                .ok()
                .map(secrecy::SecretString::from);
            providers.push(Arc::new(HttpProvider::new(name, base_url, api_key)));
            eprintln!("   Provider: {name} ({base_url})");
        }
    }
    if providers.is_empty() {
        eprintln!("   Warning: no providers configured; searches will fail");
        eprintln!("   Set FLIGHT_ASSIST_PROVIDERS=name=https://host,other=https://host2");
    }

    // ── Search orchestration ─────────────────────────────────────────────
    let tasks = TaskStore::new();
    let _sweep_handle = spawn_sweep_task(Arc::clone(&tasks), config.search.sweep_interval);

    let orchestrator = SearchOrchestrator::new(
        config.search.clone(),
        Arc::new(RouteBook::builtin()),
        providers,
        Arc::clone(&tasks),
    );

    // ── Gateway + sink ───────────────────────────────────────────────────
    let contacts = ContactStore::new(Arc::clone(&db));
    let sink = NotificationSink::new(Arc::clone(&db));
    let gateway = ConversationalGateway::new(contacts, Arc::clone(&orchestrator), Arc::clone(&sink));

    // ── HTTP server ──────────────────────────────────────────────────────
    let app = api_routes(AppState {
        gateway,
        orchestrator,
        tasks,
        sink,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Flight Assist started");
    axum::serve(listener, app).await?;

    Ok(())
}

fn env_duration_secs(var: &str, default_secs: u64) -> Duration {
    let secs = std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}
