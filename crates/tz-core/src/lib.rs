//! Shared wire types, configuration and errors for the Tokenizors services.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{CoreError, Result};
pub use types::*;
