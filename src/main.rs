use classhours::{
    api::{AppState, router},
    config::{AppConfig, database},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing as early as possible
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Non-fatal: env vars can be set externally
    dotenv().ok();

    let config = AppConfig::from_env()?;

    let db = database::create_connection(&config.database_url).await?;
    database::create_tables(&db).await?;
    info!("database ready at {}", config.database_url);

    let bind_addr = config.bind_addr.clone();
    let app = router(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
