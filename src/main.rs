use tenant_gateway::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, PORT, etc.
    let _ = dotenvy::dotenv();

    app::init_tracing();

    let config = AppConfig::from_env();
    tracing::info!("Starting tenant gateway in {:?} mode", config.environment);

    app::serve(config).await
}
