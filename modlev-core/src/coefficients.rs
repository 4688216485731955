//! Hybrid sigma-pressure vertical coordinate coefficients
//!
//! Pressure on a hybrid level is an affine function of surface pressure:
//! $$ p_k = A_k + B_k \cdot p_s $$
//!
//! Reanalysis archives usually publish the coefficients for both the half
//! (interface) levels and the full (mid) levels, as `hyai`/`hybi` and `hyam`/`hybm`.

use crate::errors::{ModLevError, ModLevResult};
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// A and B coefficients for the full and half levels of a hybrid grid
///
/// There is always exactly one more half level than full levels. Index 0 may be
/// either the top or the bottom of the atmosphere but must refer to the same end
/// for every sequence and for the fields the coefficients are applied to.
///
/// Unchecked tables deserialized from TOML or JSON should be passed through
/// [`validate`](Self::validate) before use; the solvers do this themselves.
///
/// # Examples
///
/// ```rust
/// use modlev_core::coefficients::HybridCoefficients;
///
/// let coefficients = HybridCoefficients::new(
///     vec![0.0, 5000.0],
///     vec![0.8, 0.2],
///     vec![0.0, 0.0, 10000.0],
///     vec![1.0, 0.6, 0.0],
/// )
/// .unwrap();
/// assert_eq!(coefficients.n_full(), 2);
/// assert_eq!(coefficients.n_half(), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HybridCoefficients {
    /// A coefficients on full levels (Pa)
    pub a_full: Vec<FloatValue>,
    /// B coefficients on full levels (dimensionless)
    pub b_full: Vec<FloatValue>,
    /// A coefficients on half levels (Pa)
    pub a_half: Vec<FloatValue>,
    /// B coefficients on half levels (dimensionless)
    pub b_half: Vec<FloatValue>,
}

impl HybridCoefficients {
    /// Create a validated set of coefficients
    pub fn new(
        a_full: Vec<FloatValue>,
        b_full: Vec<FloatValue>,
        a_half: Vec<FloatValue>,
        b_half: Vec<FloatValue>,
    ) -> ModLevResult<Self> {
        let coefficients = Self {
            a_full,
            b_full,
            a_half,
            b_half,
        };
        coefficients.validate()?;
        Ok(coefficients)
    }

    /// Derive full-level coefficients from a half-level table
    ///
    /// Each full level takes the mean of the two half levels that bound it, which
    /// places full-level pressure halfway between the interfaces:
    /// $$ A_k = \frac{A_{k-1/2} + A_{k+1/2}}{2}, \quad B_k = \frac{B_{k-1/2} + B_{k+1/2}}{2} $$
    pub fn from_half_levels(
        a_half: Vec<FloatValue>,
        b_half: Vec<FloatValue>,
    ) -> ModLevResult<Self> {
        if a_half.len() != b_half.len() {
            return Err(ModLevError::InvalidCoefficients(format!(
                "half-level A has {} values but B has {}",
                a_half.len(),
                b_half.len()
            )));
        }
        if a_half.len() < 2 {
            return Err(ModLevError::InvalidCoefficients(format!(
                "at least two half levels are needed to bound a layer, got {}",
                a_half.len()
            )));
        }

        let midpoints =
            |values: &[FloatValue]| values.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
        let a_full = midpoints(&a_half);
        let b_full = midpoints(&b_half);
        Self::new(a_full, b_full, a_half, b_half)
    }

    /// Check that the sequences have consistent lengths
    pub fn validate(&self) -> ModLevResult<()> {
        if self.a_full.len() != self.b_full.len() {
            return Err(ModLevError::InvalidCoefficients(format!(
                "full-level A has {} values but B has {}",
                self.a_full.len(),
                self.b_full.len()
            )));
        }
        if self.a_half.len() != self.b_half.len() {
            return Err(ModLevError::InvalidCoefficients(format!(
                "half-level A has {} values but B has {}",
                self.a_half.len(),
                self.b_half.len()
            )));
        }
        if self.a_half.len() != self.a_full.len() + 1 {
            return Err(ModLevError::InvalidCoefficients(format!(
                "expected {} half levels for {} full levels, got {}",
                self.a_full.len() + 1,
                self.a_full.len(),
                self.a_half.len()
            )));
        }
        Ok(())
    }

    /// Number of full (mid) levels
    pub fn n_full(&self) -> usize {
        self.a_full.len()
    }

    /// Number of half (interface) levels
    pub fn n_half(&self) -> usize {
        self.a_half.len()
    }
}
