//! Python bindings for the model-level calculations
//!
//! Arrays are exchanged as numpy `float64` arrays. Plain Python floats and lists
//! are accepted wherever an array is expected.

use crate::coefficients::HybridCoefficients;
use crate::errors::ModLevError;
use crate::geopotential::HydrostaticIntegrator;
use crate::parameters::HydrostaticParameters;
use crate::pressure;
use crate::time;
use crate::FloatValue;
use ndarray::{ArrayD, IxDyn};
use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArray1, PyReadonlyArrayDyn};
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;

impl From<ModLevError> for PyErr {
    fn from(err: ModLevError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

type LevelArrays<'py> = (Bound<'py, PyArrayDyn<FloatValue>>, Bound<'py, PyArrayDyn<FloatValue>>);

/// Copy a numpy array, float or list into an owned array
fn to_array(name: &str, value: &Bound<'_, PyAny>) -> PyResult<ArrayD<FloatValue>> {
    // Arrays are checked first so a one-element array keeps its shape
    if let Ok(array) = value.extract::<PyReadonlyArrayDyn<FloatValue>>() {
        return Ok(array.as_array().to_owned());
    }
    if let Ok(scalar) = value.extract::<FloatValue>() {
        return Ok(ArrayD::from_elem(IxDyn(&[]), scalar));
    }
    if let Ok(values) = value.extract::<Vec<FloatValue>>() {
        return Ok(ArrayD::from_shape_vec(IxDyn(&[values.len()]), values)
            .map_err(|e| PyValueError::new_err(e.to_string()))?);
    }
    Err(PyTypeError::new_err(format!(
        "{} must be a float64 array or a float, got {}",
        name,
        value.get_type().name()?
    )))
}

fn to_vec(name: &str, value: &Bound<'_, PyAny>) -> PyResult<Vec<FloatValue>> {
    if let Ok(array) = value.extract::<PyReadonlyArray1<FloatValue>>() {
        return Ok(array.as_array().to_vec());
    }
    value.extract::<Vec<FloatValue>>().map_err(|_| {
        PyTypeError::new_err(format!("{} must be a one-dimensional float64 array", name))
    })
}

/// Pressure on full and half model levels
///
/// `surface` is surface pressure (Pa) or its natural logarithm, as a float,
/// a `(lat, lon)` or a `(time, lat, lon)` array. Returns `(full, half)`.
#[pyfunction]
#[pyo3(signature = (surface, hyam, hybm, hyai, hybi))]
pub fn compute_pressure<'py>(
    py: Python<'py>,
    surface: &Bound<'py, PyAny>,
    hyam: &Bound<'py, PyAny>,
    hybm: &Bound<'py, PyAny>,
    hyai: &Bound<'py, PyAny>,
    hybi: &Bound<'py, PyAny>,
) -> PyResult<LevelArrays<'py>> {
    let surface = to_array("surface", surface)?;
    let coefficients = HybridCoefficients::new(
        to_vec("hyam", hyam)?,
        to_vec("hybm", hybm)?,
        to_vec("hyai", hyai)?,
        to_vec("hybi", hybi)?,
    )?;

    let levels =
        py.allow_threads(|| pressure::compute_pressure(surface.view(), &coefficients))?;
    Ok((
        levels.full.into_pyarray_bound(py),
        levels.half.into_pyarray_bound(py),
    ))
}

/// Geopotential on full and half model levels
///
/// Returns `(full, half)` in the level order of the inputs.
#[pyfunction]
#[pyo3(signature = (
    t,
    q,
    p_half,
    p_full,
    phi_s,
    dry_air_gas_constant=287.06,
    virtual_temperature_coefficient=0.609133
))]
#[allow(clippy::too_many_arguments)]
pub fn compute_geopotential<'py>(
    py: Python<'py>,
    t: &Bound<'py, PyAny>,
    q: &Bound<'py, PyAny>,
    p_half: &Bound<'py, PyAny>,
    p_full: &Bound<'py, PyAny>,
    phi_s: &Bound<'py, PyAny>,
    dry_air_gas_constant: FloatValue,
    virtual_temperature_coefficient: FloatValue,
) -> PyResult<LevelArrays<'py>> {
    let t = to_array("t", t)?;
    let q = to_array("q", q)?;
    let p_half = to_array("p_half", p_half)?;
    let p_full = to_array("p_full", p_full)?;
    let phi_s = to_array("phi_s", phi_s)?;
    let integrator = HydrostaticIntegrator::from_parameters(HydrostaticParameters {
        dry_air_gas_constant,
        virtual_temperature_coefficient,
    });

    let levels = py.allow_threads(|| {
        integrator.integrate(
            t.view(),
            q.view(),
            p_half.view(),
            p_full.view(),
            phi_s.view(),
        )
    })?;
    Ok((
        levels.full.into_pyarray_bound(py),
        levels.half.into_pyarray_bound(py),
    ))
}

/// Full-level coefficients from half-level `(hyai, hybi)` as midpoints
#[pyfunction]
pub fn full_level_coefficients(
    hyai: &Bound<'_, PyAny>,
    hybi: &Bound<'_, PyAny>,
) -> PyResult<(Vec<FloatValue>, Vec<FloatValue>)> {
    let coefficients =
        HybridCoefficients::from_half_levels(to_vec("hyai", hyai)?, to_vec("hybi", hybi)?)?;
    Ok((coefficients.a_full, coefficients.b_full))
}

/// Decode a CF time axis to ISO 8601 timestamps
///
/// The strings can be passed to `numpy.array(..., dtype="datetime64[ms]")`.
#[pyfunction]
pub fn decode_time_axis(units: &str, offsets: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
    let offsets = to_vec("offsets", offsets)?;
    let times = time::decode_time_axis(units, &offsets)?;
    Ok(times
        .iter()
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
        .collect())
}

#[pymodule]
pub fn levels(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_pressure, m)?)?;
    m.add_function(wrap_pyfunction!(compute_geopotential, m)?)?;
    m.add_function(wrap_pyfunction!(full_level_coefficients, m)?)?;
    m.add_function(wrap_pyfunction!(decode_time_axis, m)?)?;
    Ok(())
}
