//! Supporting utilities used by models.
//!
//! These modules are public because they are useful on their own (for example,
//! evaluating a single point-source response or superposing a custom load
//! history), but their APIs are not stable.
//!
//! - [`constraint`]: Type-level numeric constraints for physical inputs.
//! - [`units`]: Extensions to [`uom`] temperature arithmetic.
//! - [`response`]: Elemental unit-response kernels (g-function curve and
//!   advective-dispersive point source).
//! - [`solute`]: Mapping of heat-transport parameters onto the equivalent
//!   solute-transport problem.
//! - [`load`]: Load histories and their decomposition into step increments.
//! - [`observation`]: Observation requests (time series or snapshot).
//! - [`superposition`]: Temporal and spatial superposition of step responses.
//! - [`borehole`]: Fluid temperature assembly, calibration, and field layout.

pub mod borehole;
pub mod constraint;
pub mod load;
pub mod observation;
pub mod response;
pub mod solute;
pub mod superposition;
pub mod units;
