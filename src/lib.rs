pub mod config;
pub mod knowledge_base;
pub mod models;
pub mod qa;
pub mod server;

pub use config::AppConfig;
pub use server::run_server;
