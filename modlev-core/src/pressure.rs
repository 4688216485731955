//! Hybrid pressure solver
//!
//! Computes pressure on the full and half levels of a hybrid sigma-pressure grid
//! from surface pressure:
//! $$ p_k = A_k + B_k \cdot p_s $$
//!
//! Archives provide either surface pressure (`sp`, Pa) or its natural logarithm
//! (`lnsp`). The encoding is not flagged in the data, so each time step is
//! classified by magnitude: a step whose maximum is below
//! [`LOG_PRESSURE_THRESHOLD`] is treated as log-pressure and exponentiated.

use crate::coefficients::HybridCoefficients;
use crate::errors::ModLevResult;
use crate::parameters::LOG_PRESSURE_THRESHOLD;
use crate::rank::RankNormalizer;
use crate::FloatValue;
use log::debug;
use ndarray::{Array2, Array4, ArrayD, ArrayView2, ArrayViewD, ArrayViewMut3, Axis, Zip};

/// How surface pressure is encoded in a single time step
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEncoding {
    /// Surface pressure in Pa
    Pressure,
    /// Natural logarithm of surface pressure in Pa
    LogPressure,
}

impl SurfaceEncoding {
    /// Classify one time step of a surface field
    ///
    /// NaN values are ignored when looking for the maximum, so a step with missing
    /// values is classified by its valid points. A NaN-propagating maximum would
    /// instead classify any step containing NaN as pressure.
    pub fn classify(step: ArrayView2<FloatValue>) -> Self {
        let max = step.fold(FloatValue::NEG_INFINITY, |m, &v| m.max(v));
        if max < LOG_PRESSURE_THRESHOLD {
            SurfaceEncoding::LogPressure
        } else {
            SurfaceEncoding::Pressure
        }
    }

    /// Decode a time step to surface pressure in Pa
    pub fn decode(&self, step: ArrayView2<FloatValue>) -> Array2<FloatValue> {
        match self {
            SurfaceEncoding::Pressure => step.to_owned(),
            SurfaceEncoding::LogPressure => step.mapv(FloatValue::exp),
        }
    }
}

/// Pressure (Pa) on the full and half levels of a hybrid grid
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPressure {
    /// Pressure on full (mid) levels, `n_full` levels
    pub full: ArrayD<FloatValue>,
    /// Pressure on half (interface) levels, `n_full + 1` levels
    pub half: ArrayD<FloatValue>,
}

/// Compute pressure on full and half levels from a surface field
///
/// `surface` may be a scalar, `[lat, lon]` or `[time, lat, lon]`, holding either
/// surface pressure (Pa) or its natural logarithm. The outputs gain a level axis
/// after the time axis: a scalar gives `[level]` profiles, `[lat, lon]` gives
/// `[level, lat, lon]` and `[time, lat, lon]` gives `[time, level, lat, lon]`.
///
/// Level ordering follows the coefficients; monotonicity is not checked.
///
/// # Examples
///
/// ```rust
/// use modlev_core::coefficients::HybridCoefficients;
/// use modlev_core::pressure::compute_pressure;
/// use ndarray::arr0;
///
/// let coefficients = HybridCoefficients::new(
///     vec![2000.0],
///     vec![0.5],
///     vec![0.0, 4000.0],
///     vec![1.0, 0.0],
/// )
/// .unwrap();
///
/// let surface = arr0(100000.0).into_dyn();
/// let pressure = compute_pressure(surface.view(), &coefficients).unwrap();
/// assert_eq!(pressure.full.as_slice().unwrap(), &[52000.0]);
/// assert_eq!(pressure.half.as_slice().unwrap(), &[100000.0, 4000.0]);
/// ```
pub fn compute_pressure(
    surface: ArrayViewD<FloatValue>,
    coefficients: &HybridCoefficients,
) -> ModLevResult<LevelPressure> {
    coefficients.validate()?;
    let (surface, normalizer) = RankNormalizer::normalize_surface("surface_pressure", surface)?;
    let (n_time, n_lat, n_lon) = surface.dim();

    let mut full = Array4::zeros((n_time, coefficients.n_full(), n_lat, n_lon));
    let mut half = Array4::zeros((n_time, coefficients.n_half(), n_lat, n_lon));

    for (((time_index, step), full_step), half_step) in surface
        .outer_iter()
        .enumerate()
        .zip(full.outer_iter_mut())
        .zip(half.outer_iter_mut())
    {
        let encoding = SurfaceEncoding::classify(step);
        debug!("Surface field at time index {} is {:?}", time_index, encoding);
        let surface_pressure = encoding.decode(step);

        apply_hybrid(
            surface_pressure.view(),
            &coefficients.a_full,
            &coefficients.b_full,
            full_step,
        );
        apply_hybrid(
            surface_pressure.view(),
            &coefficients.a_half,
            &coefficients.b_half,
            half_step,
        );
    }

    let levels = normalizer.with_levels();
    Ok(LevelPressure {
        full: levels.restore(full.into_dyn()),
        half: levels.restore(half.into_dyn()),
    })
}

/// Fill `[level, lat, lon]` with `ps * B[level] + A[level]`
fn apply_hybrid(
    surface_pressure: ArrayView2<FloatValue>,
    a: &[FloatValue],
    b: &[FloatValue],
    mut out: ArrayViewMut3<FloatValue>,
) {
    for ((level, &a_k), &b_k) in out.axis_iter_mut(Axis(0)).zip(a).zip(b) {
        Zip::from(level)
            .and(&surface_pressure)
            .for_each(|p, &ps| *p = ps * b_k + a_k);
    }
}
