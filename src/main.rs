//! Pricing engine HTTP server.
//!
//! Environment:
//! - `PRICING_CONFIG_DIR`: reference-data directory (default `./config/precast`)
//! - `PRICING_BIND_ADDR`: listen address (default `0.0.0.0:3000`)
//! - `RUST_LOG`: log filter (default `info`)

use std::env;

use pricing_engine::api::{AppState, create_router};
use pricing_engine::config::ConfigLoader;
use pricing_engine::logging;
use tracing::info;

const DEFAULT_CONFIG_DIR: &str = "./config/precast";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config_dir = env::var("PRICING_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr = env::var("PRICING_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let loader = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        plant = %loader.plant().code,
        pieces = loader.config().pieces().len(),
        routes = loader.config().routes().len(),
        "Reference data loaded"
    );

    let app = create_router(AppState::new(loader));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Pricing engine listening");
    axum::serve(listener, app).await?;

    Ok(())
}
