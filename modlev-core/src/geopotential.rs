//! Hydrostatic geopotential on model levels
//!
//! Integrates the hypsometric equation from the surface upward, following
//! equations 2.20 to 2.23 of the IFS documentation (Part III, Dynamics and
//! numerical procedures).
//!
//! With levels indexed from the surface ($k = 0$) upward, half level $k$ below
//! full level $k$ and half level $k + 1$ above it:
//!
//! $$ \phi_{0} = \phi_s $$
//! $$ \phi_{k+1} = \phi_{k} + R_d T_{v,k} \ln\frac{p_{k}}{p_{k+1}} $$
//! $$ \phi^{full}_{k} = \phi_{k} + \alpha_k R_d T_{v,k} $$
//! $$ \alpha_k = 1 - \frac{p_{k+1}}{p_{k} - p_{k+1}} \ln\frac{p_{k}}{p_{k+1}} $$
//!
//! where $p$ is half-level pressure and $T_v$ is virtual temperature. For the
//! topmost layer the upper interface pressure is (close to) zero and $\alpha$ takes
//! its limiting value $\ln 2$.
//!
//! A zero half-level pressure below the top makes the log-pressure ratio
//! undefined. It is recorded as NaN, which then carries through every level above
//! it in that column. Other columns are unaffected.

use crate::errors::{ModLevError, ModLevResult};
use crate::order::LevelOrder;
use crate::parameters::HydrostaticParameters;
use crate::pressure::LevelPressure;
use crate::rank::RankNormalizer;
use crate::FloatValue;
use log::debug;
use ndarray::{Array4, ArrayD, ArrayView1, ArrayView4, ArrayViewD, ArrayViewMut1, Axis, Zip};
use std::f64::consts::LN_2;

/// Geopotential (m² s⁻²) on the full and half levels of a hybrid grid
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGeopotential {
    /// Geopotential on full (mid) levels, `n_full` levels
    pub full: ArrayD<FloatValue>,
    /// Geopotential on half (interface) levels, `n_full + 1` levels
    pub half: ArrayD<FloatValue>,
}

/// Hydrostatic geopotential integrator
///
/// # Examples
///
/// ```rust
/// use modlev_core::geopotential::HydrostaticIntegrator;
/// use modlev_core::parameters::HydrostaticParameters;
/// use ndarray::{arr0, arr1};
///
/// let integrator = HydrostaticIntegrator::from_parameters(HydrostaticParameters::default());
///
/// // Single profile ordered from the surface upward
/// let temperature = arr1(&[250.0, 250.0]).into_dyn();
/// let humidity = arr1(&[0.0, 0.0]).into_dyn();
/// let half_pressure = arr1(&[100000.0, 50000.0, 100.0]).into_dyn();
/// let full_pressure = arr1(&[75000.0, 25050.0]).into_dyn();
/// let surface_geopotential = arr0(500.0).into_dyn();
///
/// let geopotential = integrator
///     .integrate(
///         temperature.view(),
///         humidity.view(),
///         half_pressure.view(),
///         full_pressure.view(),
///         surface_geopotential.view(),
///     )
///     .unwrap();
///
/// assert_eq!(geopotential.half.shape(), &[3]);
/// assert_eq!(geopotential.half[[0]], 500.0);
/// assert!(geopotential.full[[1]] > geopotential.full[[0]]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HydrostaticIntegrator {
    parameters: HydrostaticParameters,
}

impl HydrostaticIntegrator {
    /// Create a new integrator from parameters
    pub fn from_parameters(parameters: HydrostaticParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &HydrostaticParameters {
        &self.parameters
    }

    /// Compute geopotential on full and half levels
    ///
    /// # Arguments
    ///
    /// * `temperature` - Temperature on full levels (K)
    /// * `specific_humidity` - Specific humidity on full levels (kg/kg)
    /// * `half_pressure` - Pressure on half levels (Pa), one more level than `temperature`
    /// * `full_pressure` - Pressure on full levels (Pa), used to find the level order
    /// * `surface_geopotential` - Surface geopotential (m² s⁻²) with a single level.
    ///   Axes of length one (or a scalar) are broadcast over the other fields, so a
    ///   time-invariant orography can be used with a time series.
    ///
    /// Level fields may be a scalar, `[level]`, `[level, lat, lon]` or
    /// `[time, level, lat, lon]`; after normalisation their time, lat and lon
    /// extents must agree. The outputs take the rank of `temperature`, except that
    /// a scalar temperature gives `[level]` half-level geopotential.
    ///
    /// Either level order is accepted. Top-first inputs are read through reversed
    /// views and the outputs are returned in the same order as the inputs.
    pub fn integrate(
        &self,
        temperature: ArrayViewD<FloatValue>,
        specific_humidity: ArrayViewD<FloatValue>,
        half_pressure: ArrayViewD<FloatValue>,
        full_pressure: ArrayViewD<FloatValue>,
        surface_geopotential: ArrayViewD<FloatValue>,
    ) -> ModLevResult<LevelGeopotential> {
        let (mut temperature, normalizer) =
            RankNormalizer::normalize_level("temperature", temperature)?;
        let (mut specific_humidity, _) =
            RankNormalizer::normalize_level("specific_humidity", specific_humidity)?;
        let (mut half_pressure, _) =
            RankNormalizer::normalize_level("half_level_pressure", half_pressure)?;
        let (full_pressure, _) =
            RankNormalizer::normalize_level("full_level_pressure", full_pressure)?;
        let (surface_geopotential, _) =
            RankNormalizer::normalize_level("surface_geopotential", surface_geopotential)?;

        let (n_time, n_full, n_lat, n_lon) = temperature.dim();
        check_shape(
            "specific_humidity",
            specific_humidity,
            (n_time, n_full, n_lat, n_lon),
        )?;
        check_shape("full_level_pressure", full_pressure, (n_time, n_full, n_lat, n_lon))?;
        check_shape(
            "half_level_pressure",
            half_pressure,
            (n_time, n_full + 1, n_lat, n_lon),
        )?;
        if surface_geopotential.len_of(Axis(1)) != 1 {
            return Err(ModLevError::shape(
                "surface_geopotential",
                format!(
                    "expected a single level, got {}",
                    surface_geopotential.len_of(Axis(1))
                ),
            ));
        }
        let surface_geopotential = surface_geopotential
            .broadcast((n_time, 1, n_lat, n_lon))
            .ok_or_else(|| {
                ModLevError::shape(
                    "surface_geopotential",
                    format!(
                        "shape {:?} cannot be broadcast to {:?}",
                        surface_geopotential.shape(),
                        [n_time, 1, n_lat, n_lon]
                    ),
                )
            })?;

        let order = LevelOrder::detect(full_pressure, half_pressure);

        let mut full = Array4::<FloatValue>::zeros((n_time, n_full, n_lat, n_lon));
        let mut half = Array4::<FloatValue>::zeros((n_time, n_full + 1, n_lat, n_lon));
        {
            let mut full_view = full.view_mut();
            let mut half_view = half.view_mut();
            if order == LevelOrder::TopFirst {
                // Reversed views so the recursion always starts at the surface
                temperature.invert_axis(Axis(1));
                specific_humidity.invert_axis(Axis(1));
                half_pressure.invert_axis(Axis(1));
                full_view.invert_axis(Axis(1));
                half_view.invert_axis(Axis(1));
            }

            let columns = Zip::from(full_view.lanes_mut(Axis(1)))
                .and(half_view.lanes_mut(Axis(1)))
                .and(temperature.lanes(Axis(1)))
                .and(specific_humidity.lanes(Axis(1)))
                .and(half_pressure.lanes(Axis(1)))
                .and(surface_geopotential.lanes(Axis(1)));

            #[cfg(feature = "parallel")]
            columns.par_for_each(|full, half, t, q, p, phi_s| {
                self.integrate_column(t, q, p, phi_s[0], full, half)
            });
            #[cfg(not(feature = "parallel"))]
            columns.for_each(|full, half, t, q, p, phi_s| {
                self.integrate_column(t, q, p, phi_s[0], full, half)
            });
        }

        if log::log_enabled!(log::Level::Debug) {
            let undefined = half.iter().filter(|v| v.is_nan()).count();
            if undefined > 0 {
                debug!(
                    "{} of {} half-level geopotential values are NaN",
                    undefined,
                    half.len()
                );
            }
        }

        Ok(LevelGeopotential {
            full: normalizer.restore(full.into_dyn()),
            half: normalizer.keep_levels().restore(half.into_dyn()),
        })
    }

    /// Compute geopotential using pressure from [`compute_pressure`](crate::pressure::compute_pressure)
    pub fn integrate_levels(
        &self,
        temperature: ArrayViewD<FloatValue>,
        specific_humidity: ArrayViewD<FloatValue>,
        pressure: &LevelPressure,
        surface_geopotential: ArrayViewD<FloatValue>,
    ) -> ModLevResult<LevelGeopotential> {
        self.integrate(
            temperature,
            specific_humidity,
            pressure.half.view(),
            pressure.full.view(),
            surface_geopotential,
        )
    }

    /// Integrate a single column ordered from the surface upward
    ///
    /// `half_pressure` and `half` have one more element than the full-level arrays.
    ///
    /// # Panics
    ///
    /// Panics if `half_pressure` or `half` has fewer than `temperature.len() + 1`
    /// elements, or if `specific_humidity` or `full` is shorter than `temperature`.
    pub fn integrate_column(
        &self,
        temperature: ArrayView1<FloatValue>,
        specific_humidity: ArrayView1<FloatValue>,
        half_pressure: ArrayView1<FloatValue>,
        surface_geopotential: FloatValue,
        mut full: ArrayViewMut1<FloatValue>,
        mut half: ArrayViewMut1<FloatValue>,
    ) {
        let n_full = temperature.len();
        let rd = self.parameters.dry_air_gas_constant;

        half[0] = surface_geopotential;
        for k in 0..n_full {
            let tv = self
                .parameters
                .virtual_temperature(temperature[k], specific_humidity[k]);
            let p_lower = half_pressure[k];
            let p_upper = half_pressure[k + 1];

            let ln_ratio = if p_lower != 0.0 && p_upper != 0.0 {
                (p_lower / p_upper).ln()
            } else {
                FloatValue::NAN
            };

            let alpha = if k == n_full - 1 {
                LN_2
            } else {
                1.0 - (p_upper / (p_lower - p_upper)) * ln_ratio
            };

            full[k] = half[k] + alpha * rd * tv;
            half[k + 1] = half[k] + rd * tv * ln_ratio;
        }
    }
}

/// Compute geopotential with the default [`HydrostaticParameters`]
///
/// See [`HydrostaticIntegrator::integrate`].
pub fn compute_geopotential(
    temperature: ArrayViewD<FloatValue>,
    specific_humidity: ArrayViewD<FloatValue>,
    half_pressure: ArrayViewD<FloatValue>,
    full_pressure: ArrayViewD<FloatValue>,
    surface_geopotential: ArrayViewD<FloatValue>,
) -> ModLevResult<LevelGeopotential> {
    HydrostaticIntegrator::default().integrate(
        temperature,
        specific_humidity,
        half_pressure,
        full_pressure,
        surface_geopotential,
    )
}

fn check_shape(
    field: &str,
    view: ArrayView4<FloatValue>,
    expected: (usize, usize, usize, usize),
) -> ModLevResult<()> {
    if view.dim() != expected {
        return Err(ModLevError::shape(
            field,
            format!(
                "expected [time, level, lat, lon] = {:?}, got {:?}",
                expected,
                view.dim()
            ),
        ));
    }
    Ok(())
}
