//! Chirpy API server binary.
//!
//! Reads configuration from flags, the environment, and an optional `.env`
//! file, then serves the API until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use chirpy_core::config::{AuthConfig, RotationPolicy};
use chirpy_core::store::{MemoryStore, PgStore, Store};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "chirpy_server", about = "Chirpy API server")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// PostgreSQL connection URL. Without it, data is kept in memory.
    #[arg(long, env = "DB_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Deployment mode. `dev` enables `POST /admin/reset`.
    #[arg(long, env = "PLATFORM", default_value = "prod")]
    platform: String,

    /// Access token signing secret.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Shared secret expected from the Polka webhook.
    #[arg(long, env = "POLKA_KEY", hide_env_values = true)]
    polka_key: String,

    /// Directory served under `/app/`.
    #[arg(long, env = "FILEPATH_ROOT", default_value = ".")]
    filepath_root: PathBuf,

    /// Issue a new refresh token on every refresh and revoke the old one.
    #[arg(long, env = "ROTATE_REFRESH_TOKENS", default_value_t = false)]
    rotate_refresh_tokens: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chirpy_api=debug,chirpy_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    if args.jwt_secret.is_empty() {
        return Err("JWT_SECRET must not be empty".into());
    }

    info!(port = args.port, platform = %args.platform, "starting chirpy_server");

    let store: Arc<dyn Store> = match &args.database_url {
        Some(url) => {
            info!(
                max_connections = args.max_connections,
                "configuring connection pool"
            );
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(url)
                .await?;

            info!("running database migrations");
            chirpy_api::migrate(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DB_URL not set; using in-memory store, data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let rotation = if args.rotate_refresh_tokens {
        RotationPolicy::Rotate
    } else {
        RotationPolicy::Reuse
    };

    let config = chirpy_api::config::ApiConfig {
        bind_addr: format!("0.0.0.0:{}", args.port),
        filepath_root: args.filepath_root,
        auth: AuthConfig {
            jwt_secret: args.jwt_secret,
            polka_key: args.polka_key,
            platform: args.platform,
            rotation,
        },
    };

    let state = chirpy_api::AppState::new(store, config.clone());
    let app = chirpy_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, rotation = ?rotation, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
