//! Elemental unit-response kernels.
//!
//! An elemental response is the temperature change at an observer caused by a
//! unit step load switched on at a source, as a function of the time elapsed
//! since the step. Superposing scaled and time-shifted copies of it (see
//! [`crate::support::superposition`]) gives the response to any load history.
//!
//! Two kernels are provided:
//!
//! - [`ConductionResponse`]: a precomputed g-function ([`ResponseCurve`]),
//!   interpolated in log-time. The curve already integrates the whole field,
//!   so its location type is `()`.
//! - [`PointSource`]: a continuous point source in an infinite 2D medium with
//!   uniform background flow, integrated with [`GaussLegendre`] quadrature.
//!
//! # Causality
//!
//! Every kernel returns zero for a non-positive elapsed time.

mod conduction;
mod curve;
mod point_source;
mod quadrature;

pub use conduction::ConductionResponse;
pub use curve::{ResponseCurve, ResponseCurveError};
pub use point_source::{PointSource, PointSourceConfig, PointSourceError, SoluteTransport};
pub use quadrature::{GaussLegendre, QuadratureError};

/// A unit step response evaluated at an elapsed time and a source/observer pair.
///
/// Implementations must be pure: the same inputs always give the same output,
/// and evaluation never mutates shared state, so a single kernel can be shared
/// across threads during superposition.
pub trait ElementalResponse: Sync {
    /// Where sources and observers live.
    ///
    /// Kernels without spatial dependence use `()`.
    type Location: Copy + Send + Sync;

    /// Returns the response at `observer` to a unit step at `source`,
    /// `elapsed` seconds after the step started.
    ///
    /// Returns zero when `elapsed <= 0`.
    fn respond(&self, elapsed: f64, source: Self::Location, observer: Self::Location) -> f64;

    /// Evaluates the response at several elapsed times for one observer.
    fn respond_over_time(
        &self,
        elapsed: &[f64],
        source: Self::Location,
        observer: Self::Location,
    ) -> Vec<f64> {
        elapsed
            .iter()
            .map(|&t| self.respond(t, source, observer))
            .collect()
    }

    /// Evaluates the response at several observers for one elapsed time.
    fn respond_over_space(
        &self,
        elapsed: f64,
        source: Self::Location,
        observers: &[Self::Location],
    ) -> Vec<f64> {
        observers
            .iter()
            .map(|&observer| self.respond(elapsed, source, observer))
            .collect()
    }
}

/// Replaces a non-finite elemental response with zero.
///
/// Applied to every elemental evaluation before it is accumulated. Extreme
/// parameter combinations (a vanishing elapsed time, or an advective exponent
/// that overflows) can produce `NaN` or infinities, and these are dropped
/// instead of poisoning the whole sum.
///
/// Because the substitution is silent at this level, the superposition engine
/// counts and logs every replacement.
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
