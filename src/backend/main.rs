/**
 * roomcast Server Entry Point
 *
 * Loads `.env`, sets up tracing, reads the configuration and serves the
 * Axum app until the process is stopped.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("[Server] Starting roomcast");

    let config = roomcast::backend::server::config::load_config()?;
    let port = config.port;

    let app = roomcast::backend::server::create_app(config).await?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[Server] Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin roomcast-server --features ssr");
    std::process::exit(1);
}
