//! Pipeline configuration
//!
//! Variable names default to the ECMWF short names used in ERA archives.
//!
//! ```toml
//! temperature = "t"
//! specific_humidity = "q"
//! surface_pressure = "lnsp"
//! surface_geopotential = "z"
//! time = "time"
//!
//! [hydrostatic]
//! dry_air_gas_constant = 287.06
//! ```

use crate::errors::{ModLevError, ModLevResult};
use crate::parameters::HydrostaticParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which fields the pipeline reads and the constants it integrates with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Temperature on full levels (K).
    /// Default: "t"
    pub temperature: String,

    /// Specific humidity on full levels (kg/kg).
    /// Default: "q"
    pub specific_humidity: String,

    /// Surface pressure (Pa) or its natural logarithm.
    /// Default: "lnsp"
    pub surface_pressure: String,

    /// Surface geopotential (m² s⁻²).
    /// Default: "z"
    pub surface_geopotential: String,

    /// Time coordinate, or `None` to skip time decoding.
    /// An empty name in a TOML file also skips it.
    /// Default: "time"
    pub time: Option<String>,

    pub hydrostatic: HydrostaticParameters,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            temperature: "t".to_string(),
            specific_humidity: "q".to_string(),
            surface_pressure: "lnsp".to_string(),
            surface_geopotential: "z".to_string(),
            time: Some("time".to_string()),
            hydrostatic: HydrostaticParameters::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(contents: &str) -> ModLevResult<Self> {
        toml::from_str(contents).map_err(|e| ModLevError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> ModLevResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ModLevError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Name of the time coordinate, if time decoding is enabled
    pub fn time_name(&self) -> Option<&str> {
        self.time.as_deref().filter(|name| !name.is_empty())
    }

    pub fn to_toml_string(&self) -> ModLevResult<String> {
        toml::to_string(self).map_err(|e| ModLevError::Config(e.to_string()))
    }
}
