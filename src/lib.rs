pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod schema;
pub mod store;
pub mod todo_service;
pub mod token;
pub mod user_service;
