use std::net::SocketAddr;
use std::sync::Arc;

use todo_microservices::config::Config;
use todo_microservices::store::SqliteStore;
use todo_microservices::token::TokenKeys;
use todo_microservices::user_service::{self, UserServiceState};

// Entry point for the identity service
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env(3000);

    let store = match SqliteStore::connect(&config.database_url).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "failed to connect to the database");
            std::process::exit(1);
        }
    };

    let state = Arc::new(UserServiceState::new(
        Arc::new(store),
        TokenKeys::new(config.jwt_secret.clone()),
    ));
    let app = user_service::create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!(port = config.port, "User Service running");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
