//! Direction of the vertical axis
//!
//! Archives disagree on whether level 0 is the lowest or the highest model level.
//! ERA files read with netCDF readers usually start at the top of the atmosphere.
//! The direction is inferred from pressure, which always decreases with height.

use crate::parameters::LEVEL_ORDER_PROBE;
use crate::FloatValue;
use log::{debug, warn};
use ndarray::ArrayView4;

/// Which end of the atmosphere index 0 of the level axis refers to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LevelOrder {
    /// Index 0 is the level nearest the surface
    SurfaceFirst,
    /// Index 0 is the level nearest the top of the atmosphere
    TopFirst,
}

impl LevelOrder {
    /// Infer the level order from canonical `[time, level, lat, lon]` pressure fields
    ///
    /// Full-level pressure at index 0 of the first column is compared with index
    /// [`LEVEL_ORDER_PROBE`]. Grids with fewer levels than that compare against
    /// the last full level instead, and a single-layer grid compares its two half
    /// levels. The axis is surface-first only if pressure at index 0 is strictly
    /// greater; ties and NaN classify as top-first.
    ///
    /// `half_pressure` must have one more level than `full_pressure`.
    pub fn detect(
        full_pressure: ArrayView4<FloatValue>,
        half_pressure: ArrayView4<FloatValue>,
    ) -> Self {
        let (n_time, n_full, n_lat, n_lon) = full_pressure.dim();
        if n_time == 0 || n_full == 0 || n_lat == 0 || n_lon == 0 {
            // Nothing to integrate, the direction is irrelevant
            return LevelOrder::SurfaceFirst;
        }

        let (first, probe) = if n_full > LEVEL_ORDER_PROBE {
            (
                full_pressure[[0, 0, 0, 0]],
                full_pressure[[0, LEVEL_ORDER_PROBE, 0, 0]],
            )
        } else if n_full > 1 {
            warn!(
                "Only {} full levels, comparing level 0 with level {} to find the level order",
                n_full,
                n_full - 1
            );
            (full_pressure[[0, 0, 0, 0]], full_pressure[[0, n_full - 1, 0, 0]])
        } else {
            warn!("Single full level, using half-level pressure to find the level order");
            (half_pressure[[0, 0, 0, 0]], half_pressure[[0, 1, 0, 0]])
        };

        let order = if first > probe {
            LevelOrder::SurfaceFirst
        } else {
            LevelOrder::TopFirst
        };
        debug!("Detected level order {:?} ({} vs {} Pa)", order, first, probe);
        order
    }
}
