//! End-to-end conversion of a model-level dataset
//!
//! Reads the configured fields from a [`FieldSource`], computes pressure on the
//! hybrid levels and then integrates geopotential over them.

use crate::coefficients::HybridCoefficients;
use crate::config::PipelineConfig;
use crate::errors::{ModLevError, ModLevResult};
use crate::geopotential::{HydrostaticIntegrator, LevelGeopotential};
use crate::pressure::{compute_pressure, LevelPressure};
use crate::source::FieldSource;
use crate::time::decode_time_axis;
use crate::FloatValue;
use chrono::NaiveDateTime;
use log::{debug, info};
use ndarray::{ArrayD, Axis};

/// Pressure and geopotential on the model levels of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLevelOutput {
    /// Decoded time coordinate, if one was configured
    pub times: Option<Vec<NaiveDateTime>>,
    pub pressure: LevelPressure,
    pub geopotential: LevelGeopotential,
}

#[derive(Debug, Clone, Default)]
pub struct ModelLevelPipeline {
    config: PipelineConfig,
    integrator: HydrostaticIntegrator,
}

impl ModelLevelPipeline {
    pub fn from_config(config: PipelineConfig) -> Self {
        let integrator = HydrostaticIntegrator::from_parameters(config.hydrostatic.clone());
        Self { config, integrator }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compute pressure and geopotential for every field in `source`
    ///
    /// Surface fields stored with a level axis of length one, as ERA files store
    /// `lnsp` and `z`, are accepted alongside the plain surface layouts. A
    /// `[lat, lon]` surface geopotential is used for every time step.
    pub fn run<S: FieldSource + ?Sized>(
        &self,
        source: &S,
        coefficients: &HybridCoefficients,
    ) -> ModLevResult<ModelLevelOutput> {
        let config = &self.config;
        let temperature = source.field(&config.temperature)?.values;
        let specific_humidity = source.field(&config.specific_humidity)?.values;
        let surface = drop_level_axis(source.field(&config.surface_pressure)?.values);
        let surface_geopotential = surface_geopotential_levels(
            source.field(&config.surface_geopotential)?.values,
            surface.ndim(),
        );
        info!(
            "Converting {} model levels for temperature field of shape {:?}",
            coefficients.n_full(),
            temperature.shape()
        );

        let times = match config.time_name() {
            Some(name) => {
                let time = source.field(name)?;
                let offsets: Vec<FloatValue> = time.values.iter().copied().collect();
                let times = decode_time_axis(&time.units, &offsets)?;
                let n_time = if temperature.ndim() == 4 {
                    temperature.len_of(Axis(0))
                } else {
                    1
                };
                if times.len() != n_time {
                    return Err(ModLevError::shape(
                        name,
                        format!(
                            "{} time values for {} time steps of {}",
                            times.len(),
                            n_time,
                            config.temperature
                        ),
                    ));
                }
                Some(times)
            }
            None => None,
        };

        let pressure = compute_pressure(surface.view(), coefficients)?;
        let geopotential = self.integrator.integrate_levels(
            temperature.view(),
            specific_humidity.view(),
            &pressure,
            surface_geopotential.view(),
        )?;

        Ok(ModelLevelOutput {
            times,
            pressure,
            geopotential,
        })
    }
}

/// `[time, 1, lat, lon]` surface fields become `[time, lat, lon]`
fn drop_level_axis(values: ArrayD<FloatValue>) -> ArrayD<FloatValue> {
    if values.ndim() == 4 && values.len_of(Axis(1)) == 1 {
        debug!("Dropping level axis of surface field {:?}", values.shape());
        values.index_axis_move(Axis(1), 0)
    } else {
        values
    }
}

/// Give a surface geopotential field the single level axis the integrator expects
fn surface_geopotential_levels(values: ArrayD<FloatValue>, surface_rank: usize) -> ArrayD<FloatValue> {
    match values.ndim() {
        // [lat, lon]
        2 => values.insert_axis(Axis(0)),
        // [time, lat, lon] alongside a time series of surface pressure
        3 if surface_rank == 3 => values.insert_axis(Axis(1)),
        _ => values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Field, MemoryFieldSource};
    use approx::assert_relative_eq;
    use ndarray::{arr1, Array, Array4};

    fn coefficients() -> HybridCoefficients {
        HybridCoefficients::new(
            vec![1000.0, 3000.0],
            vec![0.75, 0.25],
            vec![0.0, 2000.0, 4000.0],
            vec![1.0, 0.5, 0.0],
        )
        .unwrap()
    }

    fn source(n_time: usize) -> MemoryFieldSource {
        let shape = (n_time, 2, 3, 4);
        let mut temperature = Array4::<FloatValue>::zeros(shape);
        temperature.index_axis_mut(Axis(1), 0).fill(280.0);
        temperature.index_axis_mut(Axis(1), 1).fill(240.0);

        MemoryFieldSource::new()
            .with_field("t", Field::new(temperature.into_dyn(), "K"))
            .with_field(
                "q",
                Field::new(Array::from_elem(shape, 0.002).into_dyn(), "kg kg**-1"),
            )
            .with_field(
                "lnsp",
                Field::new(
                    Array::from_elem((n_time, 1, 3, 4), 100000.0_f64.ln()).into_dyn(),
                    "~",
                ),
            )
            .with_field(
                "z",
                Field::new(Array::from_elem((3, 4), 9.80665).into_dyn(), "m**2 s**-2"),
            )
            .with_field(
                "time",
                Field::new(
                    Array::from_iter((0..n_time).map(|i| 6.0 * i as FloatValue)).into_dyn(),
                    "hours since 2016-01-01 00:00:00",
                ),
            )
    }

    #[test]
    fn run_era_layout() {
        let pipeline = ModelLevelPipeline::default();
        let output = pipeline.run(&source(3), &coefficients()).unwrap();

        let times = output.times.unwrap();
        assert_eq!(times.len(), 3);
        assert_eq!(times[2].to_string(), "2016-01-01 12:00:00");

        assert_eq!(output.pressure.full.shape(), &[3, 2, 3, 4]);
        assert_eq!(output.geopotential.half.shape(), &[3, 3, 3, 4]);
        assert_relative_eq!(
            output.pressure.half[[1, 0, 2, 3]],
            100000.0,
            max_relative = 1e-12
        );
        let geopotential = &output.geopotential;
        for time in 0..3 {
            assert_eq!(geopotential.half[[time, 0, 1, 1]], 9.80665);
            assert!(geopotential.full[[time, 1, 1, 1]] > geopotential.full[[time, 0, 1, 1]]);
        }
    }

    #[test]
    fn matches_direct_calculation() {
        let pipeline = ModelLevelPipeline::default();
        let output = pipeline.run(&source(1), &coefficients()).unwrap();

        let direct = HydrostaticIntegrator::default()
            .integrate_levels(
                source(1).field("t").unwrap().values.view(),
                source(1).field("q").unwrap().values.view(),
                &output.pressure,
                Array::from_elem((1, 1, 3, 4), 9.80665).into_dyn().view(),
            )
            .unwrap();
        assert_eq!(output.geopotential, direct);
    }

    #[test]
    fn configured_names_are_used() {
        let mut source = source(1);
        let sp = source.field("lnsp").unwrap().values.mapv(FloatValue::exp);
        source.insert("sp", Field::new(sp, "Pa"));

        let config = PipelineConfig::from_toml_str(
            r#"
            surface_pressure = "sp"
            time = ""
            "#,
        )
        .unwrap();
        let output = ModelLevelPipeline::from_config(config)
            .run(&source, &coefficients())
            .unwrap();

        assert!(output.times.is_none());
        let expected = ModelLevelPipeline::default().run(&source, &coefficients()).unwrap();
        for (a, b) in output.pressure.half.iter().zip(expected.pressure.half.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
    }

    #[test]
    fn missing_fields_are_reported() {
        let source = MemoryFieldSource::new()
            .with_field("t", Field::new(arr1(&[250.0]).into_dyn(), "K"));
        let result = ModelLevelPipeline::default().run(&source, &coefficients());
        match result {
            Err(ModLevError::MissingField(name)) => assert_eq!(name, "q"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn time_length_must_match() {
        let mut source = source(2);
        source.insert(
            "time",
            Field::new(arr1(&[0.0]).into_dyn(), "hours since 2016-01-01"),
        );
        let result = ModelLevelPipeline::default().run(&source, &coefficients());
        assert!(matches!(result, Err(ModLevError::InvalidShape { .. })));
    }

    #[test]
    fn bad_time_units_are_reported() {
        let mut source = source(1);
        source.insert("time", Field::new(arr1(&[0.0]).into_dyn(), "hours"));
        let result = ModelLevelPipeline::default().run(&source, &coefficients());
        assert!(matches!(result, Err(ModLevError::InvalidTimeUnits { .. })));
    }
}
