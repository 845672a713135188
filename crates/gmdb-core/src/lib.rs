pub mod app_config;
pub mod config;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod sales;
pub mod scores;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use sales::{BulletinWindow, HardwareSale, SoftwareSale, WindowKey};
pub use scores::{Metascore, ScoreRecord, NOT_AVAILABLE};
pub use store::{Collection, Store, StoreError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("window {link} starts after it ends ({start_date} > {end_date})")]
    InvertedWindow {
        link: String,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    },
}
