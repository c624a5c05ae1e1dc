pub mod app_config;
pub mod config;
pub mod deals;
pub mod targets;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use deals::{Address, DealDetail, DealStatus, DealSummary};
pub use targets::{load_targets, parse_targets, LocationOverride, TargetConfig, TargetsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read targets file {path}: {source}")]
    TargetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse targets file: {0}")]
    TargetsFileParse(#[source] serde_yaml::Error),

    #[error("invalid target configuration: {0}")]
    Validation(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
