//! Access to named fields of a reanalysis dataset
//!
//! Reading archive files is left to the caller. Anything that can look up a field
//! by variable name implements [`FieldSource`], which is all the
//! [`ModelLevelPipeline`](crate::pipeline::ModelLevelPipeline) needs.

use crate::errors::{ModLevError, ModLevResult};
use crate::FloatValue;
use ndarray::ArrayD;
use std::collections::HashMap;

/// Values of a named variable together with its units attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub values: ArrayD<FloatValue>,
    /// Units as stored in the archive, e.g. `"K"` or `"hours since 1900-01-01"`
    pub units: String,
}

impl Field {
    pub fn new(values: ArrayD<FloatValue>, units: impl Into<String>) -> Self {
        Self {
            values,
            units: units.into(),
        }
    }
}

pub trait FieldSource {
    /// Look up a field by variable name
    ///
    /// Returns [`ModLevError::MissingField`] if the source has no such variable.
    fn field(&self, name: &str) -> ModLevResult<Field>;

    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_ok()
    }
}

/// A [`FieldSource`] backed by arrays held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFieldSource {
    fields: HashMap<String, Field>,
}

impl MemoryFieldSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with_field(mut self, name: &str, field: Field) -> Self {
        self.insert(name, field);
        self
    }

    /// Add or replace a field, returning the previous one
    pub fn insert(&mut self, name: &str, field: Field) -> Option<Field> {
        self.fields.insert(name.to_string(), field)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FieldSource for MemoryFieldSource {
    fn field(&self, name: &str) -> ModLevResult<Field> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| ModLevError::MissingField(name.to_string()))
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}
