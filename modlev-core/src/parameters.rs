//! Physical constants used by the hydrostatic integration
//!
//! The defaults follow the IFS documentation (Part III, Dynamics and numerical
//! procedures) used to produce ERA reanalyses.

use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Values of the surface field below this are taken to be $\ln(p_s)$ rather than $p_s$.
///
/// The natural log of a realistic surface pressure in Pa is about 11, while the
/// pressure itself is in the tens of thousands.
pub const LOG_PRESSURE_THRESHOLD: FloatValue = 50.0;

/// Full-level index compared against level 0 to find the direction of the vertical axis
pub const LEVEL_ORDER_PROBE: usize = 10;

/// Parameters for the hydrostatic geopotential integration.
///
/// # Default Values
///
/// - `dry_air_gas_constant`: 287.06 J kg⁻¹ K⁻¹
/// - `virtual_temperature_coefficient`: 0.609133, i.e. $R_v / R_d - 1$
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HydrostaticParameters {
    /// Gas constant for dry air $R_d$ (J kg⁻¹ K⁻¹).
    /// Default: 287.06
    pub dry_air_gas_constant: FloatValue,

    /// Moisture coefficient in $T_v = T (1 + c\,q)$ (dimensionless).
    /// Default: 0.609133
    pub virtual_temperature_coefficient: FloatValue,
}

impl Default for HydrostaticParameters {
    fn default() -> Self {
        Self {
            dry_air_gas_constant: 287.06,
            virtual_temperature_coefficient: 0.609133,
        }
    }
}

impl HydrostaticParameters {
    /// Virtual temperature (K) from temperature (K) and specific humidity (kg/kg)
    #[inline]
    pub fn virtual_temperature(
        &self,
        temperature: FloatValue,
        specific_humidity: FloatValue,
    ) -> FloatValue {
        temperature * (1.0 + self.virtual_temperature_coefficient * specific_humidity)
    }
}
