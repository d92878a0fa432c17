use serde::Deserialize;

use super::{BackendError, BackendFuture, EchoBackend, EchoRequest, EchoResponse};
use crate::swath::SwathGeometry;

/// Echo simulator reached over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpEchoBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEchoBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Footprints of a finished simulation.
    pub async fn fetch_swaths(&self, simulation_id: &str) -> Result<Vec<SwathGeometry>, BackendError> {
        let url = format!("{}/simulation/{}/swath", self.base_url, simulation_id);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        let body: SwathListResponse = response.json().await?;
        Ok(body.swaths.into_iter().map(SwathGeometry::from).collect())
    }

    async fn post_echo(&self, request: EchoRequest) -> Result<EchoResponse, BackendError> {
        let url = format!("{}/echo/simulate-multiple", self.base_url);
        log::debug!(
            "posting {} targets and {} satellite states to {}",
            request.targets.len(),
            request.satellite_states.len(),
            url
        );
        let response = self.client.post(&url).json(&request).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

impl EchoBackend for HttpEchoBackend {
    fn simulate(&self, request: EchoRequest) -> BackendFuture<'_> {
        Box::pin(self.post_echo(request))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        detail,
    })
}

#[derive(Debug, Deserialize)]
struct SwathListResponse {
    #[serde(default)]
    swaths: Vec<RemoteSwath>,
}

/// The simulator reports geometries with camelCase keys.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteSwath {
    center_lat: f64,
    center_lon: f64,
    heading: f64,
    near_range: f64,
    far_range: f64,
    swath_width: f64,
    azimuth_length: f64,
    #[serde(default)]
    satellite_altitude: Option<f64>,
    #[serde(default)]
    look_angle: Option<f64>,
}

impl From<RemoteSwath> for SwathGeometry {
    fn from(remote: RemoteSwath) -> Self {
        SwathGeometry {
            center_lat: remote.center_lat,
            center_lon: remote.center_lon,
            heading: remote.heading,
            near_range: remote.near_range,
            far_range: remote.far_range,
            swath_width: remote.swath_width,
            azimuth_length: remote.azimuth_length,
            satellite_altitude: remote.satellite_altitude,
            look_angle: remote.look_angle,
        }
    }
}
