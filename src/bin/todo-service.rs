use std::net::SocketAddr;
use std::sync::Arc;

use todo_microservices::config::Config;
use todo_microservices::store::SqliteStore;
use todo_microservices::todo_service::{self, TodoServiceState};
use todo_microservices::token::TokenKeys;

// Entry point for the todo service
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env(3001);

    let store = match SqliteStore::connect(&config.database_url).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "failed to connect to the database");
            std::process::exit(1);
        }
    };

    let state = Arc::new(TodoServiceState::new(
        Arc::new(store),
        TokenKeys::new(config.jwt_secret.clone()),
    ));
    let app = todo_service::create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!(port = config.port, "Todo Service running");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
