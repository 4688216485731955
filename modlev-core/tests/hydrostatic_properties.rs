//! Physical properties of the pressure and geopotential calculations.
//!
//! These tests verify behaviour that must hold for any input:
//! - The result does not depend on the direction of the level axis
//! - Geopotential at the surface is the supplied surface geopotential
//! - Undefined pressure ratios only affect levels above them

use approx::assert_relative_eq;
use modlev_core::coefficients::HybridCoefficients;
use modlev_core::geopotential::{compute_geopotential, LevelGeopotential};
use modlev_core::pressure::compute_pressure;
use modlev_core::FloatValue;
use ndarray::{arr0, arr1, s, Array, Array3, Array4, ArrayD, Axis, Ix4};

const RD: FloatValue = 287.06;

/// Surface-first inputs for `n_time` steps on a 3 x 4 grid
struct Inputs {
    temperature: Array4<FloatValue>,
    specific_humidity: Array4<FloatValue>,
    half_pressure: Array4<FloatValue>,
    full_pressure: Array4<FloatValue>,
    surface_geopotential: Array4<FloatValue>,
}

impl Inputs {
    fn surface_first(n_time: usize, n_full: usize) -> Self {
        let (n_lat, n_lon) = (3, 4);
        let temperature = Array::from_shape_fn((n_time, n_full, n_lat, n_lon), |(t, k, y, x)| {
            290.0 - 5.0 * k as FloatValue + t as FloatValue + 0.5 * y as FloatValue
                - 0.25 * x as FloatValue
        });
        let specific_humidity =
            Array::from_shape_fn((n_time, n_full, n_lat, n_lon), |(_, k, y, _)| {
                0.01 * (-(k as FloatValue)).exp() * (1.0 + 0.1 * y as FloatValue)
            });
        let half_pressure =
            Array::from_shape_fn((n_time, n_full + 1, n_lat, n_lon), |(t, k, _, x)| {
                let surface = 100000.0 - 500.0 * x as FloatValue - 100.0 * t as FloatValue;
                let top = 100.0;
                surface - (surface - top) * k as FloatValue / n_full as FloatValue
            });
        let full_pressure = Array::from_shape_fn((n_time, n_full, n_lat, n_lon), |(t, k, y, x)| {
            0.5 * (half_pressure[[t, k, y, x]] + half_pressure[[t, k + 1, y, x]])
        });
        let surface_geopotential =
            Array::from_shape_fn((n_time, 1, n_lat, n_lon), |(_, _, y, x)| {
                9.80665 * (100.0 * y as FloatValue + 10.0 * x as FloatValue)
            });

        Self {
            temperature,
            specific_humidity,
            half_pressure,
            full_pressure,
            surface_geopotential,
        }
    }

    fn reversed(&self) -> Self {
        Self {
            temperature: reverse_levels(&self.temperature.clone().into_dyn()),
            specific_humidity: reverse_levels(&self.specific_humidity.clone().into_dyn()),
            half_pressure: reverse_levels(&self.half_pressure.clone().into_dyn()),
            full_pressure: reverse_levels(&self.full_pressure.clone().into_dyn()),
            surface_geopotential: self.surface_geopotential.clone(),
        }
    }

    fn geopotential(&self) -> LevelGeopotential {
        compute_geopotential(
            self.temperature.view().into_dyn(),
            self.specific_humidity.view().into_dyn(),
            self.half_pressure.view().into_dyn(),
            self.full_pressure.view().into_dyn(),
            self.surface_geopotential.view().into_dyn(),
        )
        .unwrap()
    }
}

fn reverse_levels(values: &ArrayD<FloatValue>) -> Array4<FloatValue> {
    values
        .view()
        .into_dimensionality::<Ix4>()
        .unwrap()
        .slice(s![.., ..;-1, .., ..])
        .to_owned()
}

fn assert_all_close(actual: &Array4<FloatValue>, expected: &ArrayD<FloatValue>) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, max_relative = 1e-12);
    }
}

mod level_order {
    use super::*;

    #[test]
    fn test_reversed_inputs_give_reversed_outputs() {
        let inputs = Inputs::surface_first(2, 12);
        let forward = inputs.geopotential();
        let backward = inputs.reversed().geopotential();

        assert_all_close(&reverse_levels(&backward.full), &forward.full);
        assert_all_close(&reverse_levels(&backward.half), &forward.half);
    }

    #[test]
    fn test_short_grids_are_order_invariant() {
        for n_full in [1, 2, 5] {
            let inputs = Inputs::surface_first(1, n_full);
            let forward = inputs.geopotential();
            let backward = inputs.reversed().geopotential();

            assert_all_close(&reverse_levels(&backward.full), &forward.full);
            assert_all_close(&reverse_levels(&backward.half), &forward.half);
        }
    }
}

mod boundaries {
    use super::*;

    #[test]
    fn test_surface_anchor() {
        let inputs = Inputs::surface_first(2, 12);
        let expected = inputs.surface_geopotential.index_axis(Axis(1), 0);

        let forward = inputs.geopotential();
        let half: Array4<FloatValue> = forward.half.into_dimensionality().unwrap();
        assert_eq!(half.index_axis(Axis(1), 0), expected);

        let backward = inputs.reversed().geopotential();
        let half: Array4<FloatValue> = backward.half.into_dimensionality().unwrap();
        assert_eq!(half.index_axis(Axis(1), 12), expected);
    }

    #[test]
    fn test_zero_top_pressure_keeps_top_full_level_finite() {
        let mut inputs = Inputs::surface_first(1, 12);
        inputs.half_pressure.index_axis_mut(Axis(1), 12).fill(0.0);

        let result = inputs.geopotential();
        let full: Array4<FloatValue> = result.full.into_dimensionality().unwrap();
        let half: Array4<FloatValue> = result.half.into_dimensionality().unwrap();

        assert!(full.index_axis(Axis(1), 11).iter().all(|v| v.is_finite()));
        assert!(half.index_axis(Axis(1), 11).iter().all(|v| v.is_finite()));
        assert!(half.index_axis(Axis(1), 12).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_zero_interior_pressure_propagates_upward() {
        let mut inputs = Inputs::surface_first(1, 12);
        // Only the first column is affected
        inputs.half_pressure[[0, 4, 0, 0]] = 0.0;

        let result = inputs.geopotential();
        let full: Array4<FloatValue> = result.full.into_dimensionality().unwrap();
        let half: Array4<FloatValue> = result.half.into_dimensionality().unwrap();

        let column_half = half.slice(s![0, .., 0, 0]);
        let column_full = full.slice(s![0, .., 0, 0]);
        for k in 0..4usize {
            assert!(column_half[k].is_finite(), "half level {}", k);
        }
        for k in 0..3usize {
            assert!(column_full[k].is_finite(), "full level {}", k);
        }
        for k in 4..13usize {
            assert!(column_half[k].is_nan(), "half level {}", k);
        }
        for k in 3..12usize {
            assert!(column_full[k].is_nan(), "full level {}", k);
        }

        assert!(half.slice(s![0, .., 1, 1]).iter().all(|v| v.is_finite()));
    }
}

mod scenarios {
    use super::*;

    fn expected_two_level_profile() -> ([FloatValue; 2], [FloatValue; 3]) {
        let thickness = RD * 250.0;
        let half_1 = 500.0 + thickness * (100000.0_f64 / 50000.0).ln();
        let half_2 = half_1 + thickness * (50000.0_f64 / 100.0).ln();
        let alpha_0 = 1.0 - (50000.0 / (100000.0 - 50000.0)) * (100000.0_f64 / 50000.0).ln();
        let full_0 = 500.0 + alpha_0 * thickness;
        let full_1 = half_1 + 2.0_f64.ln() * thickness;
        ([full_0, full_1], [500.0, half_1, half_2])
    }

    #[test]
    fn test_two_level_profile() {
        let (expected_full, expected_half) = expected_two_level_profile();

        let result = compute_geopotential(
            arr1(&[250.0, 250.0]).into_dyn().view(),
            arr1(&[0.0, 0.0]).into_dyn().view(),
            arr1(&[100000.0, 50000.0, 100.0]).into_dyn().view(),
            arr1(&[75000.0, 25050.0]).into_dyn().view(),
            arr0(500.0).into_dyn().view(),
        )
        .unwrap();

        assert_eq!(result.full.shape(), &[2]);
        assert_eq!(result.half.shape(), &[3]);
        for (actual, expected) in result.full.iter().zip(expected_full) {
            assert_relative_eq!(*actual, expected, max_relative = 1e-6);
        }
        for (actual, expected) in result.half.iter().zip(expected_half) {
            assert_relative_eq!(*actual, expected, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_log_surface_pressure_to_geopotential() {
        let (expected_full, expected_half) = expected_two_level_profile();
        let coefficients = HybridCoefficients::new(
            vec![50.0, 50.0],
            vec![0.75, 0.25],
            vec![0.0, 0.0, 100.0],
            vec![1.0, 0.5, 0.0],
        )
        .unwrap();

        // lnsp for 100000 Pa on a 2 x 2 grid at two time steps
        let lnsp = Array3::from_elem((2, 2, 2), 100000.0_f64.ln());
        let pressure = compute_pressure(lnsp.into_dyn().view(), &coefficients).unwrap();
        assert_eq!(pressure.half.shape(), &[2, 3, 2, 2]);
        assert_relative_eq!(pressure.half[[1, 1, 0, 1]], 50000.0, max_relative = 1e-12);

        let temperature = Array4::from_elem((2, 2, 2, 2), 250.0);
        let humidity = Array4::<FloatValue>::zeros((2, 2, 2, 2));
        let orography = Array::from_elem((1, 2, 2), 500.0);
        let result = compute_geopotential(
            temperature.into_dyn().view(),
            humidity.into_dyn().view(),
            pressure.half.view(),
            pressure.full.view(),
            orography.into_dyn().view(),
        )
        .unwrap();

        let full: Array4<FloatValue> = result.full.into_dimensionality().unwrap();
        let half: Array4<FloatValue> = result.half.into_dimensionality().unwrap();
        for column in full.lanes(Axis(1)) {
            for (actual, expected) in column.iter().zip(expected_full) {
                assert_relative_eq!(*actual, expected, max_relative = 1e-6);
            }
        }
        for column in half.lanes(Axis(1)) {
            for (actual, expected) in column.iter().zip(expected_half) {
                assert_relative_eq!(*actual, expected, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn test_single_time_step_keeps_rank() {
        let (expected_full, expected_half) = expected_two_level_profile();
        let shape = (2, 3, 4);
        let mut half_pressure = Array3::<FloatValue>::zeros((3, 3, 4));
        for (k, p) in [100000.0, 50000.0, 100.0].iter().enumerate() {
            half_pressure.index_axis_mut(Axis(0), k).fill(*p);
        }
        let mut full_pressure = Array3::<FloatValue>::zeros(shape);
        for (k, p) in [75000.0, 25050.0].iter().enumerate() {
            full_pressure.index_axis_mut(Axis(0), k).fill(*p);
        }

        let result = compute_geopotential(
            Array3::from_elem(shape, 250.0).into_dyn().view(),
            Array3::<FloatValue>::zeros(shape).into_dyn().view(),
            half_pressure.into_dyn().view(),
            full_pressure.into_dyn().view(),
            Array3::from_elem((1, 3, 4), 500.0).into_dyn().view(),
        )
        .unwrap();

        assert_eq!(result.full.shape(), &[2, 3, 4]);
        assert_eq!(result.half.shape(), &[3, 3, 4]);
        assert_eq!(result.half[[0, 0, 0]], 500.0);
        let full: Array3<FloatValue> = result.full.into_dimensionality().unwrap();
        let half: Array3<FloatValue> = result.half.into_dimensionality().unwrap();
        for column in full.lanes(Axis(0)) {
            for (actual, expected) in column.iter().zip(expected_full) {
                assert_relative_eq!(*actual, expected, max_relative = 1e-6);
            }
        }
        for column in half.lanes(Axis(0)) {
            for (actual, expected) in column.iter().zip(expected_half) {
                assert_relative_eq!(*actual, expected, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn test_scalar_column() {
        let result = compute_geopotential(
            arr0(250.0).into_dyn().view(),
            arr0(0.0).into_dyn().view(),
            arr1(&[100000.0, 0.0]).into_dyn().view(),
            arr0(50000.0).into_dyn().view(),
            arr0(0.0).into_dyn().view(),
        )
        .unwrap();

        assert_eq!(result.full.ndim(), 0);
        assert_eq!(result.half.shape(), &[2]);
        assert_relative_eq!(
            *result.full.first().unwrap(),
            2.0_f64.ln() * RD * 250.0,
            max_relative = 1e-12
        );
        assert_eq!(result.half[[0]], 0.0);
    }
}
