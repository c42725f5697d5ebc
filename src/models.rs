//! Public Twine models.
//!
//! Models are the primary public interface of this crate.
//!
//! # Organization
//!
//! Models are grouped by domain. The only domain so far is
//! [`geothermal`]: temperature response of borehole heat exchanger fields.
//!
//! # Model structure
//!
//! Each domain keeps its computation in an internal `core` module. The
//! [`twine_core::Model`] implementations are thin adapters that validate and
//! convert at the boundary, then delegate to that core. A single `core` may
//! back several adapters.

pub mod geothermal;
