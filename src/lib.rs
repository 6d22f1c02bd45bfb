pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod security;

// Re-export main components for easier use
pub use api::rest::{router, AppState, RestApi};
pub use config::Config;
pub use db::DatabaseService;
pub use error::Error;
