use ecosarthi_portal::{
    AppState,
    backend::{BackendState, HttpBackendClient},
    config::{AppConfig, Env},
    create_router,
    session_store::{InMemorySessionStore, PostgresSessionStore, SessionState, spawn_expiry_sweep},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// main
///
/// Entry point of the portal gateway: configuration, logging, session store, backend
/// client and the HTTP server, in that order.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise debug for the gateway itself.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ecosarthi_portal=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal gateway starting in {:?} mode", config.env);

    if config.demo_fallback_enabled() {
        tracing::warn!("DEMO_LOGIN_FALLBACK is on: unverifiable logins will receive demo sessions");
    } else if config.demo_login_fallback {
        tracing::warn!("DEMO_LOGIN_FALLBACK is ignored outside the local environment");
    }

    // 3. Session store: Postgres when DATABASE_URL is set, in-memory otherwise.
    let sessions: SessionState = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("FATAL: Failed to run database migrations.");
            tracing::info!("Using Postgres session store");
            Arc::new(PostgresSessionStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; sessions are kept in memory and lost on restart");
            Arc::new(InMemorySessionStore::new())
        }
    };

    spawn_expiry_sweep(
        sessions.clone(),
        Duration::from_secs(config.session_ttl_secs),
        SESSION_SWEEP_INTERVAL,
    );

    // 4. Backend API client
    let backend = HttpBackendClient::new(
        &config.backend_url,
        Duration::from_secs(config.backend_timeout_secs),
    )
    .expect("FATAL: Failed to build the backend HTTP client.");
    tracing::info!("Backend API at {}", config.backend_url);
    let backend = Arc::new(backend) as BackendState;

    // 5. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        sessions,
        backend,
        config,
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
