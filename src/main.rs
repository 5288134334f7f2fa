use std::error::Error;

use marketplace::{
    config::Config,
    create_app,
    entities::{connect, ensure_admin, setup_schema},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = connect(&config).await?;
    setup_schema(&db).await?;
    ensure_admin(&db, &config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    let app = create_app(db, config);
    axum::serve(listener, app).await?;
    Ok(())
}
