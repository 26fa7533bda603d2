use thiserror::Error;

use crate::region::RegionId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Region not found: {0}")]
    RegionNotFound(RegionId),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
