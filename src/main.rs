use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use leadhook::auth::token;
use leadhook::config::Config;
use leadhook::rate_limit::SlidingWindowLimiter;
use leadhook::settings::FileSettingsStore;
use leadhook::store::PgLeadStore;
use leadhook::validate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `leadhook hash-token <token>` prints the digest for LEADHOOK_OPERATOR_TOKEN_SHA256
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-token") {
        let Some(raw) = args.get(2) else {
            return Err("usage: leadhook hash-token <token>".into());
        };
        if !validate::validate_password(raw) {
            return Err("operator token needs at least 8 characters, a letter and a digit".into());
        }
        println!("{}", token::hash_token(raw));
        return Ok(());
    }

    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting leadhook");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Migrations applied");

    if config.operator_token_sha256.is_none() {
        tracing::warn!("LEADHOOK_OPERATOR_TOKEN_SHA256 not set, integration settings API disabled");
    }

    let addr = SocketAddr::new(config.host, config.port);
    let settings = Arc::new(FileSettingsStore::new(config.settings_path.clone()));
    let store = Arc::new(PgLeadStore::new(pool));
    let limiter = Arc::new(SlidingWindowLimiter::new());

    let state = leadhook::build_state(config, store, settings, limiter)?;
    let cleanup = leadhook::spawn_limiter_cleanup(state.clone(), Duration::from_secs(300));
    let app = leadhook::build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cleanup.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
