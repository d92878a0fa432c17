use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pulse::{SatelliteState, Target};
use crate::radar::SarConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EchoSatelliteState {
    #[schema(value_type = Vec<f64>)]
    pub position: [f64; 3],
    #[schema(value_type = Vec<f64>)]
    pub velocity: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<f64>>)]
    pub beam_direction: Option<[f64; 3]>,
}

impl From<&SatelliteState> for EchoSatelliteState {
    fn from(state: &SatelliteState) -> Self {
        Self {
            position: state.position,
            velocity: state.velocity,
            beam_direction: Some(state.nadir()),
        }
    }
}

/// Body of `POST /echo/simulate-multiple`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EchoRequest {
    pub config: SarConfig,
    pub targets: Vec<Target>,
    pub satellite_states: Vec<EchoSatelliteState>,
}

/// Simulator result. Only the sample count and shape are read here; every
/// other field is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EchoResponse {
    pub num_samples: u64,
    pub shape: Vec<u64>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_keeps_unknown_fields() {
        let json = r#"{
            "success": true, "message": "ok", "shape": [100, 4096],
            "dtype": "complex64", "data": "AAAA", "num_pulses": 100, "num_samples": 4096
        }"#;
        let response: EchoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.num_samples, 4096);
        assert_eq!(response.shape, vec![100, 4096]);
        assert_eq!(response.extra["dtype"], "complex64");

        let back = serde_json::to_value(&response).unwrap();
        assert_eq!(back["data"], "AAAA");
        assert_eq!(back["num_pulses"], 100);
    }
}
