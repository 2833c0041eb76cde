mod api;
mod auth;
mod error;
mod filter;
mod models;
mod state;
mod store;

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "query-service")]
struct Args {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Shared with the token issuer.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let database_url = shared::normalize_database_url(&args.database_url);

    // Connections are opened lazily; an unreachable database surfaces per request.
    let config = diesel_async::pooled_connection::AsyncDieselConnectionManager::<AsyncPgConnection>::new(&database_url);
    let pool = Pool::builder().build(config).await?;

    let app_state = state::AppState {
        store: Arc::new(store::PgMetricsStore::new(pool)),
        verifier: Arc::new(auth::HmacVerifier::new(&args.jwt_secret)),
    };

    let app = api::create_router(app_state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port)).await?;

    info!("Query service started on port {}", args.port);
    info!("Endpoints: GET /, GET /health, GET /api/metrics, GET /api/metrics/time-series");

    axum::serve(listener, app).await?;

    Ok(())
}
