use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RadarError;

/// SAR system parameters, field names as the echo simulator expects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SarConfig {
    /// Carrier frequency (Hz)
    pub fc: f64,
    /// Bandwidth (Hz)
    pub bw: f64,
    /// Sampling frequency (Hz)
    pub fs: f64,
    /// Pulse width (s)
    pub taup: f64,
    /// Pulse repetition frequency (Hz)
    pub prf: f64,
    /// Sampling window start time (s)
    pub swst: f64,
    /// Sampling window length (s)
    pub swl: f64,
    /// Orbit height (m)
    pub orbit_height: f64,
    /// Antenna width (m)
    pub antenna_width: f64,
    /// Antenna height (m)
    pub antenna_height: f64,
    #[serde(default)]
    pub antenna_roll_angle: f64,
    #[serde(default)]
    pub antenna_pitch_angle: f64,
    #[serde(default)]
    pub antenna_yaw_angle: f64,
    /// Transmit power (W)
    #[serde(rename = "Pt", default = "default_pt")]
    pub pt: f64,
    #[serde(rename = "G_recv", default = "default_g_recv")]
    pub g_recv: f64,
    /// Noise figure (dB)
    #[serde(rename = "NF", default = "default_nf")]
    pub nf: f64,
    /// System loss (dB)
    #[serde(rename = "Loss", default = "default_loss")]
    pub loss: f64,
    /// System temperature (K)
    #[serde(rename = "Tsys", default = "default_tsys")]
    pub tsys: f64,
    #[serde(default = "default_adc_bits")]
    pub adc_bits: u32,
    #[serde(default = "default_beam_id")]
    pub beam_id: String,
    /// Beam elevation angle (deg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub el_angle: Option<f64>,
}

fn default_pt() -> f64 {
    1000.0
}

fn default_g_recv() -> f64 {
    1.0
}

fn default_nf() -> f64 {
    3.0
}

fn default_loss() -> f64 {
    2.0
}

fn default_tsys() -> f64 {
    290.0
}

fn default_adc_bits() -> u32 {
    12
}

fn default_beam_id() -> String {
    "Beam0000".to_string()
}

impl SarConfig {
    /// Checks the geometry-relevant parameters. `require_prf` is set when the
    /// ranked range model will be used.
    pub fn validate(&self, require_prf: bool) -> Result<(), RadarError> {
        positive("fc", self.fc)?;
        if self.swst.is_nan() || self.swst < 0.0 {
            return Err(RadarError::NegativeSwst(self.swst));
        }
        if self.taup.is_nan() || self.taup < 0.0 {
            return Err(RadarError::NegativeTaup(self.taup));
        }
        positive("swl", self.swl)?;
        positive("orbit_height", self.orbit_height)?;
        positive("antenna_width", self.antenna_width)?;
        positive("antenna_height", self.antenna_height)?;
        if require_prf && (self.prf.is_nan() || self.prf <= 0.0) {
            return Err(RadarError::PrfRequired(self.prf));
        }
        Ok(())
    }

    /// C-band stripmap defaults (the "C5" seed configuration).
    pub fn c5() -> Self {
        Self {
            fc: 5.41e9,
            bw: 150e6,
            fs: 250e6,
            taup: 11e-6,
            prf: 5930.0,
            swst: 47.8e-6,
            swl: 45.5e-6,
            orbit_height: 561e3,
            antenna_width: 3.9,
            antenna_height: 1.9,
            antenna_roll_angle: 0.0,
            antenna_pitch_angle: 0.0,
            antenna_yaw_angle: 0.0,
            pt: 3200.0,
            g_recv: 60.0,
            nf: 3.5,
            loss: 2.0,
            tsys: 270.0,
            adc_bits: 12,
            beam_id: default_beam_id(),
            el_angle: None,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), RadarError> {
    if value.is_nan() || value <= 0.0 {
        return Err(RadarError::NotPositive { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c5_is_valid() {
        assert_eq!(SarConfig::c5().validate(true), Ok(()));
    }

    #[test]
    fn rejects_bad_window_and_antenna() {
        let mut config = SarConfig::c5();
        config.swl = 0.0;
        assert_eq!(
            config.validate(false),
            Err(RadarError::NotPositive {
                field: "swl",
                value: 0.0
            })
        );

        let mut config = SarConfig::c5();
        config.antenna_height = -1.0;
        assert!(matches!(
            config.validate(false),
            Err(RadarError::NotPositive {
                field: "antenna_height",
                ..
            })
        ));

        let mut config = SarConfig::c5();
        config.swst = -1e-6;
        assert_eq!(config.validate(false), Err(RadarError::NegativeSwst(-1e-6)));

        let mut config = SarConfig::c5();
        config.taup = -1e-6;
        assert_eq!(config.validate(false), Err(RadarError::NegativeTaup(-1e-6)));
    }

    #[test]
    fn prf_only_required_for_ranked_model() {
        let mut config = SarConfig::c5();
        config.prf = 0.0;
        assert_eq!(config.validate(false), Ok(()));
        assert_eq!(config.validate(true), Err(RadarError::PrfRequired(0.0)));
    }

    #[test]
    fn deserialises_backend_field_names() {
        let json = r#"{
            "fc": 5.4e9, "bw": 150e6, "fs": 250e6, "taup": 10e-6, "prf": 5000,
            "swst": 10e-6, "swl": 50e-6, "orbit_height": 517e3,
            "antenna_width": 4.0, "antenna_height": 0.5, "Pt": 2000
        }"#;
        let config: SarConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pt, 2000.0);
        assert_eq!(config.tsys, 290.0);
        assert_eq!(config.beam_id, "Beam0000");

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["G_recv"], 1.0);
        assert!(value.get("el_angle").is_none());
    }
}
