use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veobot_api::config::ServerConfig;
use veobot_api::{routes, state};
use veobot_pipeline::notify::TelegramNotifier;
use veobot_pipeline::pg::{PgLedger, PgTaskStore, PgUserDirectory, PgVideoArchive};
use veobot_pipeline::{
    BotHandle, BotRegistry, CallbackProcessor, Orchestrator, ProviderChain, SettlementDeps,
};
use veobot_providers::kie::{KieClient, KieConfig};
use veobot_providers::vertex::{VertexClient, VertexConfig};
use veobot_providers::VideoProvider;
use veobot_telegram::TelegramApi;

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veobot=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = veobot_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    veobot_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    veobot_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Provider chain (order = preference) ---
    let mut providers: Vec<Arc<dyn VideoProvider>> = Vec::new();
    if let Some(kie) = &config.kie {
        let client = KieClient::new(KieConfig::new(
            kie.base_url.clone(),
            kie.api_key.clone(),
            kie.callback_url.clone(),
        ))
        .expect("Failed to build Kie.ai client");
        providers.push(Arc::new(client));
        tracing::info!("Kie.ai provider configured");
    }
    if let Some(vertex) = &config.vertex {
        let client = VertexClient::new(VertexConfig::new(
            vertex.base_url.clone(),
            vertex.project_id.clone(),
            vertex.location.clone(),
            vertex.model_id.clone(),
            vertex.access_token.clone(),
        ))
        .expect("Failed to build Vertex client");
        providers.push(Arc::new(client));
        tracing::info!("Vertex AI provider configured");
    }
    assert!(
        !providers.is_empty(),
        "At least one provider must be configured (KIE_API_KEY or VERTEX_* variables)"
    );
    let chain = ProviderChain::new(providers);

    // --- Bot registry ---
    let registry = Arc::new(BotRegistry::new(
        config
            .bots
            .iter()
            .map(|b| BotHandle {
                name: b.name.clone(),
                token: b.token.clone(),
            })
            .collect(),
    ));
    assert!(!registry.is_empty(), "BOT_TOKENS must name at least one bot");
    tracing::info!(bots = registry.len(), "Bot registry built");

    // --- Pipeline wiring ---
    let telegram = TelegramApi::new().expect("Failed to build Telegram client");
    let settlement = SettlementDeps {
        ledger: Arc::new(PgLedger::new(pool.clone())),
        archive: Arc::new(PgVideoArchive::new(pool.clone())),
        users: Arc::new(PgUserDirectory::new(pool.clone())),
        notifier: Arc::new(TelegramNotifier::new(telegram)),
    };
    let tasks = Arc::new(PgTaskStore::new(pool.clone()));

    let orchestrator = Arc::new(Orchestrator::new(
        chain,
        Arc::clone(&registry),
        tasks.clone(),
        settlement.clone(),
    ));
    let callbacks = Arc::new(CallbackProcessor::new(tasks, registry, settlement));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        orchestrator,
        callbacks,
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        .merge(routes::router())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500 JSON.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // Shared state.
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
