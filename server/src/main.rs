use std::net::SocketAddr;

use axum::Router;
use dotenvy::dotenv;
use sea_orm::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

use savora_core::{ensure_schema, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost:5432/savora".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8000);

    let db = Database::connect(&database_url).await?;
    ensure_schema(&db).await?;

    let state = AppState { db };
    let app = Router::new()
        .merge(savora_core::urls::router())
        .merge(savora_recipe::urls::router())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on http://{}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
