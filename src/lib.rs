//! # Twine Geothermal
//!
//! Long-term temperature response of borehole heat exchanger (BHE) fields,
//! built as models for [Twine](https://github.com/isentropic-dev/twine).
//!
//! The ground is treated as a linear system: a load history is broken into
//! step increments, each increment is weighted by an elemental unit-step
//! response, and the results are summed in time and over sources. Two
//! elemental responses are available: a precomputed g-function for
//! conduction-dominated fields, and an analytical point source for aquifers
//! with groundwater flow.
//!
//! ## Crate layout
//!
//! - [`models`]: Domain-specific [`twine_core::Model`] implementations.
//! - [`support`]: Supporting utilities used by models.
//!
//! ## Utility code lifecycle
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable. Breaking changes may occur as needed.
//!
//! Model-specific code lives in the model's internal `core` module and stays
//! private; only utilities in [`support`] are public.

pub mod models;
pub mod support;
