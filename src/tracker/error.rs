use thiserror::Error;

use crate::radar::RadarError;
use crate::swath::SwathError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("update interval must be greater than zero")]
    InvalidInterval,
    #[error("invalid batch trigger: {0}")]
    InvalidBatch(String),
    #[error("swath range: {0}")]
    Range(#[from] RadarError),
    #[error("batch processing needs an echo backend")]
    BackendRequired,
    #[error("swath error: {0}")]
    Swath(#[from] SwathError),
}
