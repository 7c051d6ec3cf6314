//! Server binary: settings from env, migrations before traffic, then serve.

use std::str::FromStr;

use gazetteer::{api_routes, apply_migrations, AppState, Settings, MIGRATIONS};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gazetteer=info".parse()?))
        .init();

    let settings = Settings::from_env();
    let options = SqliteConnectOptions::from_str(&settings.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await?;

    // The one ordering barrier: a partially migrated schema is never served.
    let applied = apply_migrations(&pool, MIGRATIONS).await.map_err(|e| {
        tracing::error!(error = %e, "migration failed; refusing to start");
        e
    })?;
    tracing::info!(applied, "migrations up to date");

    let state = AppState { pool };
    let app = api_routes(state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
