//! Pressure and geopotential on the hybrid sigma-pressure levels of reanalysis output
//!
//! Model-level archives such as ERA-Interim and ERA5 store temperature and humidity
//! on hybrid levels together with the surface pressure (or its log) and the surface
//! geopotential. This crate reconstructs the pressure of every level from the
//! hybrid coefficients and integrates the hydrostatic equation to obtain
//! geopotential on full and half levels.
//!
//! Fields may be passed at any of the ranks callers commonly slice to (see
//! [`rank`]) and with the vertical axis in either direction (see [`order`]).

pub mod coefficients;
pub mod config;
pub mod errors;
pub mod geopotential;
pub mod order;
pub mod parameters;
pub mod pipeline;
pub mod pressure;
pub mod python;
pub mod rank;
pub mod source;
pub mod time;

pub use geopotential::compute_geopotential;
pub use pressure::compute_pressure;

pub type FloatValue = f64;
