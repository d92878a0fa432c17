use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrbitError {
    #[error("eccentricity {0} outside [0, 1)")]
    InvalidEccentricity(f64),
    #[error("semi-major axis {0} km is below the Earth's radius")]
    SemiMajorAxisBelowEarth(f64),
    #[error("exactly one of mean_anomaly_deg or true_anomaly_deg is required")]
    AnomalyRequired,
    #[error("invalid tle format")]
    InvalidTleFormat,
    #[error("invalid tle: {0}")]
    InvalidTle(#[from] sgp4::TleError),
    #[error("elements error: {0}")]
    Elements(#[from] sgp4::ElementsError),
    #[error("propagation error: {0}")]
    Propagation(String),
}

impl From<sgp4::Error> for OrbitError {
    fn from(err: sgp4::Error) -> Self {
        OrbitError::Propagation(err.to_string())
    }
}
