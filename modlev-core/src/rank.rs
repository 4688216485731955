//! Rank normalisation for flexible-rank inputs
//!
//! Reanalysis fields arrive with whatever dimensions the caller happened to slice:
//! a single value, a vertical profile, one time step of a 3-D field or a full time
//! series. The solvers only work on a canonical layout:
//!
//! - level fields: `[time, level, lat, lon]`
//! - surface fields: `[time, lat, lon]`
//!
//! A [`RankNormalizer`] records which canonical axes were missing from the caller's
//! array, expands a view to the canonical layout by inserting singleton axes, and
//! later removes the same axes from an output so it comes back in the caller's rank.
//!
//! | Kind    | Rank | Caller layout           |
//! |---------|------|-------------------------|
//! | Level   | 0    | scalar                  |
//! | Level   | 1    | `[level]`               |
//! | Level   | 3    | `[level, lat, lon]`     |
//! | Level   | 4    | `[time, level, lat, lon]` |
//! | Surface | 0    | scalar                  |
//! | Surface | 2    | `[lat, lon]`            |
//! | Surface | 3    | `[time, lat, lon]`      |
//!
//! # Examples
//!
//! ```rust
//! use modlev_core::rank::RankNormalizer;
//! use ndarray::Array1;
//!
//! let profile = Array1::from(vec![250.0, 240.0, 230.0]).into_dyn();
//! let (canonical, normalizer) = RankNormalizer::normalize_level("t", profile.view()).unwrap();
//! assert_eq!(canonical.shape(), &[1, 3, 1, 1]);
//!
//! let restored = normalizer.restore(canonical.to_owned().into_dyn());
//! assert_eq!(restored.shape(), &[3]);
//! ```

use crate::errors::{ModLevError, ModLevResult};
use crate::FloatValue;
use ndarray::{ArrayD, ArrayView3, ArrayView4, ArrayViewD, Axis, Ix3, Ix4};

/// Whether a field carries a vertical axis
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Canonical layout `[time, level, lat, lon]`
    Level,
    /// Canonical layout `[time, lat, lon]`
    Surface,
}

/// Shape bookkeeping between a caller's array and the canonical layout
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RankNormalizer {
    kind: FieldKind,
    rank: usize,
}

impl RankNormalizer {
    /// Create a normalizer for a field of the given kind and rank
    ///
    /// Fails with [`ModLevError::InvalidShape`] if the rank is not supported for
    /// that kind of field.
    pub fn new(field: &str, kind: FieldKind, rank: usize) -> ModLevResult<Self> {
        let supported = match kind {
            FieldKind::Level => matches!(rank, 0 | 1 | 3 | 4),
            FieldKind::Surface => matches!(rank, 0 | 2 | 3),
        };
        if !supported {
            return Err(ModLevError::shape(
                field,
                format!("rank {} is not supported for a {:?} field", rank, kind),
            ));
        }
        Ok(Self { kind, rank })
    }

    /// Expand a level field to `[time, level, lat, lon]`
    pub fn normalize_level<'a>(
        field: &str,
        view: ArrayViewD<'a, FloatValue>,
    ) -> ModLevResult<(ArrayView4<'a, FloatValue>, Self)> {
        let normalizer = Self::new(field, FieldKind::Level, view.ndim())?;
        let canonical = normalizer
            .expand(view)
            .into_dimensionality::<Ix4>()
            .map_err(|e| ModLevError::shape(field, e.to_string()))?;
        Ok((canonical, normalizer))
    }

    /// Expand a surface field to `[time, lat, lon]`
    pub fn normalize_surface<'a>(
        field: &str,
        view: ArrayViewD<'a, FloatValue>,
    ) -> ModLevResult<(ArrayView3<'a, FloatValue>, Self)> {
        let normalizer = Self::new(field, FieldKind::Surface, view.ndim())?;
        let canonical = normalizer
            .expand(view)
            .into_dimensionality::<Ix3>()
            .map_err(|e| ModLevError::shape(field, e.to_string()))?;
        Ok((canonical, normalizer))
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Rank of the caller's original array
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Rank of the canonical layout for this kind of field
    pub fn canonical_rank(&self) -> usize {
        match self.kind {
            FieldKind::Level => 4,
            FieldKind::Surface => 3,
        }
    }

    /// Normalizer for a level field computed from this field
    ///
    /// A surface field of rank 0, 2 or 3 yields level fields of rank 1, 3 or 4
    /// respectively. Level fields map to themselves.
    pub fn with_levels(&self) -> Self {
        match self.kind {
            FieldKind::Level => *self,
            FieldKind::Surface => Self {
                kind: FieldKind::Level,
                rank: self.rank + 1,
            },
        }
    }

    /// Normalizer that keeps the level axis when restoring
    ///
    /// Half-level outputs of a scalar level field have two levels, so they come
    /// back as `[level]` rather than being squeezed to a scalar.
    pub fn keep_levels(&self) -> Self {
        match (self.kind, self.rank) {
            (FieldKind::Level, 0) => Self {
                kind: FieldKind::Level,
                rank: 1,
            },
            _ => *self,
        }
    }

    /// Canonical axes that are absent from the caller's array, in ascending order
    fn inserted_axes(&self) -> &'static [usize] {
        match (self.kind, self.rank) {
            (FieldKind::Level, 0) => &[0, 1, 2, 3],
            (FieldKind::Level, 1) => &[0, 2, 3],
            (FieldKind::Level, 3) => &[0],
            (FieldKind::Surface, 0) => &[0, 1, 2],
            (FieldKind::Surface, 2) => &[0],
            // Already canonical. Unsupported ranks are rejected in `new`.
            _ => &[],
        }
    }

    /// Insert singleton axes so that `view` has the canonical rank
    pub fn expand<'a>(&self, view: ArrayViewD<'a, FloatValue>) -> ArrayViewD<'a, FloatValue> {
        self.inserted_axes()
            .iter()
            .fold(view, |v, &axis| v.insert_axis(Axis(axis)))
    }

    /// Remove the axes inserted by [`expand`](Self::expand) from a canonical array
    ///
    /// # Panics
    ///
    /// Panics if `array` does not have the canonical rank, or if an axis to be
    /// removed is empty.
    pub fn restore(&self, array: ArrayD<FloatValue>) -> ArrayD<FloatValue> {
        assert_eq!(
            array.ndim(),
            self.canonical_rank(),
            "Only canonical arrays can be restored"
        );
        self.inserted_axes()
            .iter()
            .rev()
            .fold(array, |a, &axis| a.index_axis_move(Axis(axis), 0))
    }
}
