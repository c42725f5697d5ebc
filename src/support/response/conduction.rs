use std::f64::consts::PI;

use uom::si::{f64::ThermalConductivity, thermal_conductivity::watt_per_meter_kelvin};

use crate::support::constraint::{Constrained, StrictlyPositive};

use super::{ElementalResponse, ResponseCurve};

/// Conductive step response of a borehole field from its g-function.
///
/// A unit step of `1 W/m` raises the mean borehole-wall temperature by
/// `g(t) / (2π k_s)` kelvin after `t` seconds, where `k_s` is the ground
/// thermal conductivity.
///
/// The g-function describes the field as a whole, so there is no spatial
/// dependence and the location type is `()`.
#[derive(Debug, Clone, Copy)]
pub struct ConductionResponse<'a> {
    curve: &'a ResponseCurve,
    conductivity: f64,
}

impl<'a> ConductionResponse<'a> {
    /// Creates a response from a prebuilt curve and the ground conductivity.
    #[must_use]
    pub fn new(
        curve: &'a ResponseCurve,
        conductivity: Constrained<ThermalConductivity, StrictlyPositive>,
    ) -> Self {
        Self {
            curve,
            conductivity: conductivity.into_inner().get::<watt_per_meter_kelvin>(),
        }
    }

    /// The dimensionless g-function value at `elapsed` seconds.
    #[must_use]
    pub fn g_function(&self, elapsed: f64) -> f64 {
        self.curve.value_at(elapsed)
    }

    /// Ground thermal resistance `g(t) / (2π k_s)`, in (m·K)/W.
    #[must_use]
    pub fn ground_resistance(&self, elapsed: f64) -> f64 {
        self.g_function(elapsed) / (2.0 * PI * self.conductivity)
    }

    /// The underlying curve.
    #[must_use]
    pub fn curve(&self) -> &'a ResponseCurve {
        self.curve
    }
}

impl ElementalResponse for ConductionResponse<'_> {
    type Location = ();

    fn respond(&self, elapsed: f64, _source: (), _observer: ()) -> f64 {
        self.ground_resistance(elapsed)
    }
}
