//! Example to run the Grapiz relay standalone
//!
//! Run with: cargo run -p grapiz-server --example run_server

use grapiz_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig::default();

    println!("Starting Grapiz relay on port {}", config.port);
    println!("Connect clients to ws://localhost:{}/ws", config.port);

    run_server(config).await
}
