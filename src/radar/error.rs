use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RadarError {
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("swst must not be negative (got {0})")]
    NegativeSwst(f64),
    #[error("taup must not be negative (got {0})")]
    NegativeTaup(f64),
    #[error("far range {far:.0} m must exceed near range {near:.0} m")]
    InvalidRange { near: f64, far: f64 },
    #[error("prf must be greater than zero for the ranked range model (got {0})")]
    PrfRequired(f64),
}
