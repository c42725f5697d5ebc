//! Extensions to [`uom`] temperature arithmetic.
//!
//! Superposition produces temperature *changes*, while the assembled results
//! are absolute temperatures. [`uom`] keeps the two apart
//! ([`TemperatureInterval`] vs. [`ThermodynamicTemperature`]), which is what we
//! want, but it does not provide the conversions between them that this crate
//! needs:
//!
//! - [`TemperatureDifference::minus`]: absolute minus absolute gives an interval.
//! - [`TemperatureShift::plus`]: absolute plus interval gives an absolute.
//!
//! ```
//! use uom::si::{
//!     f64::{TemperatureInterval, ThermodynamicTemperature},
//!     temperature_interval::kelvin as delta_kelvin,
//!     thermodynamic_temperature::degree_celsius,
//! };
//! use twine_geothermal::support::units::{TemperatureDifference, TemperatureShift};
//!
//! let ground = ThermodynamicTemperature::new::<degree_celsius>(10.0);
//! let fluid = ground.plus(TemperatureInterval::new::<delta_kelvin>(6.35));
//! assert!((fluid.minus(ground).get::<delta_kelvin>() - 6.35).abs() < 1e-12);
//! ```
//!
//! See [uom#380](https://github.com/iliekturtles/uom/issues/380) for background
//! on why these are extension traits.

use uom::si::{
    f64::{TemperatureInterval, ThermodynamicTemperature},
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::kelvin as abs_kelvin,
};

/// Subtracts two absolute temperatures to get a [`TemperatureInterval`].
pub trait TemperatureDifference {
    /// Returns the temperature difference `self - other`.
    fn minus(self, other: Self) -> TemperatureInterval;
}

impl TemperatureDifference for ThermodynamicTemperature {
    fn minus(self, other: Self) -> TemperatureInterval {
        TemperatureInterval::new::<delta_kelvin>(
            self.get::<abs_kelvin>() - other.get::<abs_kelvin>(),
        )
    }
}

/// Offsets an absolute temperature by a [`TemperatureInterval`].
pub trait TemperatureShift {
    /// Returns `self + delta` as an absolute temperature.
    fn plus(self, delta: TemperatureInterval) -> Self;
}

impl TemperatureShift for ThermodynamicTemperature {
    fn plus(self, delta: TemperatureInterval) -> Self {
        ThermodynamicTemperature::new::<abs_kelvin>(
            self.get::<abs_kelvin>() + delta.get::<delta_kelvin>(),
        )
    }
}

/// Converts a perturbation in kelvin into a [`TemperatureInterval`].
pub(crate) fn kelvin_interval(value: f64) -> TemperatureInterval {
    TemperatureInterval::new::<delta_kelvin>(value)
}
