//! Borehole heat exchanger field models.
//!
//! Two [`twine_core::Model`] adapters share one superposition core:
//!
//! - [`PointSourceField`]: advective-dispersive heat transport from one or
//!   more line loads in an aquifer with uniform groundwater flow. Returns
//!   absolute ground temperatures at the requested times or locations.
//! - [`GFunctionField`]: conduction-only response of a whole field described
//!   by its g-function. Returns borehole-wall and fluid temperatures at the
//!   end of every load step.

mod core;
mod g_function_field;
mod point_source_field;

pub use g_function_field::{
    GFunctionField, GFunctionFieldError, GFunctionFieldInput, GFunctionFieldOutput,
};
pub use point_source_field::{PointSourceField, PointSourceFieldError, PointSourceFieldInput};
