//! Configuration
//!
//! Vehicle parameters and controller gains, set once at initialization and
//! immutable during flight. Defaults carry the flight-tested values for the
//! reference airframe; a TOML parameter file overrides them per vehicle.

use std::fs::read_to_string;
use std::path::Path;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::{AttitudeGains, MixerParams, PositionGains};
use crate::{Mat3, Vec3};

/// An error that occurs while loading a parameter file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read the parameter file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("cannot parse the parameter file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Rigid-body parameters of the vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleParams {
    /// Mass [kg]
    pub mass: f64,
    /// Inertia tensor diagonal [kg·m²] (body frame; the airframe is
    /// symmetric enough that off-diagonal terms are negligible)
    pub inertia: Vec3,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: Vector3::new(0.01466, 0.01466, 0.02848),
        }
    }
}

impl VehicleParams {
    /// Full inertia tensor
    pub fn inertia_matrix(&self) -> Mat3 {
        Matrix3::from_diagonal(&self.inertia)
    }
}

/// Complete flight-control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Control loop period [s]
    pub dt: f64,
    /// Rigid-body parameters
    pub vehicle: VehicleParams,
    /// Attitude controller gains
    pub attitude: AttitudeGains,
    /// Position controller gains
    pub position: PositionGains,
    /// Mixer geometry and output limits
    pub mixer: MixerParams,
}

/// Control loop period of the reference airframe: 2.5 ms (400 Hz)
pub const DEFAULT_DT: f64 = 0.0025;

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            vehicle: VehicleParams::default(),
            attitude: AttitudeGains::default(),
            position: PositionGains::default(),
            mixer: MixerParams::default(),
        }
    }
}

impl FlightConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML parameter file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_reference_airframe() {
        let config = FlightConfig::default();
        assert_relative_eq!(config.dt, 0.0025, epsilon = 1e-12);
        assert_relative_eq!(config.vehicle.mass, 1.0, epsilon = 1e-12);
        assert_relative_eq!(config.vehicle.inertia.z, 0.02848, epsilon = 1e-12);
        assert_relative_eq!(config.attitude.kw.z, 2750.0, epsilon = 1e-12);
        assert_relative_eq!(config.mixer.arm_length, 0.1625, epsilon = 1e-12);
    }

    #[test]
    fn test_inertia_matrix_is_diagonal() {
        let params = VehicleParams::default();
        let j = params.inertia_matrix();
        assert_relative_eq!(j[(0, 0)], 0.01466, epsilon = 1e-12);
        assert_relative_eq!(j[(0, 1)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(j.transpose(), j, epsilon = 1e-12);
    }

    #[test]
    fn test_partial_toml_overrides_defaults() {
        let config = FlightConfig::from_toml_str(
            r#"
            [vehicle]
            mass = 1.2
            inertia = [0.015, 0.015, 0.03]

            [attitude]
            kr = [250.0, 250.0, 0.0]
            kw = [40.0, 40.0, 2500.0]
            "#,
        )
        .unwrap();

        assert_relative_eq!(config.vehicle.mass, 1.2, epsilon = 1e-12);
        assert_relative_eq!(config.attitude.kr.x, 250.0, epsilon = 1e-12);
        // Unspecified sections keep their defaults
        assert_relative_eq!(config.mixer.arm_length, 0.1625, epsilon = 1e-12);
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        assert!(FlightConfig::from_toml_str("vehicle = 3").is_err());
    }
}
