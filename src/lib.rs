// Exported for the embedding, vector store and LLM clients
pub mod config;
pub mod error;

pub use config::Config;
pub use error::{ConfigError, Result};
