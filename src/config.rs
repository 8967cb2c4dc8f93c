use std::path::PathBuf;

/// Runtime configuration for a service instance.
///
/// Every value comes from the environment (a `.env` file is loaded by the
/// binaries before this is read). The struct is passed explicitly into the
/// service constructors so tests can build isolated instances instead of
/// relying on process-global state.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub database_url: String,
    pub user_service_url: String,
    pub todo_service_url: String,
    pub public_dir: PathBuf,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    ///
    /// `default_port` differs per binary (3000 user, 3001 todo, 3002 gateway).
    pub fn from_env(default_port: u16) -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(default_port);

        Self {
            port,
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your_jwt_secret_key".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://todo-app.db".to_string()),
            user_service_url: std::env::var("USER_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string()),
            todo_service_url: std::env::var("TODO_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3001".to_string()),
            public_dir: std::env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public")),
        }
    }
}
