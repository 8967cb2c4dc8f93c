use std::net::SocketAddr;
use std::sync::Arc;

use todo_microservices::config::Config;
use todo_microservices::gateway::{self, GatewayState, HttpUpstreamClient};

// Entry point for the edge gateway
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env(3002);

    let state = Arc::new(GatewayState::new(
        Arc::new(HttpUpstreamClient::new()),
        &config,
    ));
    let app = gateway::create_router(state, &config);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!(port = config.port, "Gateway listening");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
