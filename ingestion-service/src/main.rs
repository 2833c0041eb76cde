mod api;
mod models;
mod pipeline;
mod schema;
mod store;
mod upstream;

#[cfg(test)]
mod testing;

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use diesel::PgConnection;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

use anyhow::Result;
use clap::Parser;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection};
use diesel::Connection;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ingestion-service")]
struct Args {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "DATA_SOURCE_URL", default_value = "http://data-source:3000")]
    data_source_url: String,

    #[arg(long, env = "TRANSFORMER_URL", default_value = "http://transformer:8080/transform")]
    transformer_url: String,

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

    info!("Data source URL: {}", args.data_source_url);
    info!("Transformer URL: {}", args.transformer_url);

    // Creates raw_data.orders with its UNIQUE(order_id) constraint
    info!("Running database migrations...");
    let mut conn = PgConnection::establish(&database_url)?;
    conn.run_pending_migrations(MIGRATIONS).map_err(|e| anyhow::anyhow!("Migration error: {}", e))?;
    info!("Migrations completed successfully");

    let config = diesel_async::pooled_connection::AsyncDieselConnectionManager::<AsyncPgConnection>::new(&database_url);
    let pool = Pool::builder().build(config).await?;

    let client = upstream::build_client()?;
    let pipeline = pipeline::Pipeline::new(
        Arc::new(upstream::HttpOrderSource::new(client.clone(), args.data_source_url)),
        Arc::new(store::PgOrderStore::new(pool)),
        Arc::new(upstream::HttpTransformer::new(client, args.transformer_url)),
    );

    let app_state = api::AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = api::create_router(app_state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port)).await?;

    info!("Ingestion service started on port {}", args.port);
    info!("Endpoints: GET /health, POST /trigger");

    axum::serve(listener, app).await?;

    Ok(())
}
