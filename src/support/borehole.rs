//! Borehole temperatures from ground perturbations.
//!
//! The superposition engine returns temperature changes of the ground at the
//! borehole wall. The circulating fluid sits behind the borehole thermal
//! resistance `R_b`, so for a linear load `q` (W/m, positive = injection)
//!
//! ```text
//! T_fluid = T_ground + q·R_b
//! ```
//!
//! This module also carries the small, closed-form helpers that go with a
//! borehole field: peak temperatures, the effective undisturbed ground
//! temperature, the characteristic time, and a rectangular field layout.

#[cfg(test)]
use std::f64::consts::PI;

use uom::si::{
    f64::{
        HeatFluxDensity, Length, MassDensity, SpecificHeatCapacity, TemperatureInterval,
        ThermalConductivity, ThermodynamicTemperature, Time,
    },
    heat_flux_density::watt_per_square_meter,
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    temperature_interval::kelvin as delta_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    time::{hour, second},
};

use crate::support::{
    constraint::{Constrained, ConstraintResult, NonNegative, StrictlyPositive},
    observation::Position,
    response::ConductionResponse,
    units::{TemperatureShift, kelvin_interval},
};

/// Borehole thermal resistance between the wall and the fluid, in (m·K)/W.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoreholeResistance(Constrained<f64, NonNegative>);

impl BoreholeResistance {
    /// Creates a resistance from a value in (m·K)/W.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is negative or `NaN`.
    pub fn new(value: f64) -> ConstraintResult<Self> {
        Ok(Self(NonNegative::new(value)?))
    }

    /// The resistance in (m·K)/W.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0.get()
    }

    /// Temperature rise across the resistance for a linear load in W/m.
    #[must_use]
    pub fn rise(self, load: f64) -> TemperatureInterval {
        kelvin_interval(load * self.value())
    }
}

/// Fluid temperature for a ground temperature and a linear load.
#[must_use]
pub fn ground_to_fluid(
    ground: ThermodynamicTemperature,
    load: f64,
    resistance: BoreholeResistance,
) -> ThermodynamicTemperature {
    ground.plus(resistance.rise(load))
}

/// Ground temperature for a fluid temperature and a linear load.
#[must_use]
pub fn fluid_to_ground(
    fluid: ThermodynamicTemperature,
    load: f64,
    resistance: BoreholeResistance,
) -> ThermodynamicTemperature {
    fluid.plus(-resistance.rise(load))
}

/// Empirical correction fitted against a reference design tool.
///
/// Applied as `T_base + q·(R_b·F − R_b) + offset`. There is no default:
/// both constants must come from an external fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Multiplier `F` on the borehole resistance.
    pub resistance_factor: f64,
    /// Constant added after the resistance correction.
    pub offset: TemperatureInterval,
}

impl Calibration {
    /// Corrects a fluid temperature computed with the uncorrected resistance.
    #[must_use]
    pub fn apply(
        &self,
        base: ThermodynamicTemperature,
        load: f64,
        resistance: BoreholeResistance,
    ) -> ThermodynamicTemperature {
        let rb = resistance.value();
        let correction = load * (rb * self.resistance_factor - rb);
        base.plus(kelvin_interval(correction) + self.offset)
    }
}

/// Duration of the peak load pulse added on top of the monthly response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakConfig {
    pub duration: Time,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            duration: Time::new::<hour>(8.0),
        }
    }
}

/// Fluid temperature during a short peak load on top of a base temperature.
///
/// `T_peak = T_base + q_peak·(R_b + g(t_peak) / (2π k_s))`.
#[must_use]
pub fn peak_temperature(
    base: ThermodynamicTemperature,
    peak_load: f64,
    resistance: BoreholeResistance,
    response: &ConductionResponse<'_>,
    config: PeakConfig,
) -> ThermodynamicTemperature {
    let elapsed = config.duration.get::<second>();
    let total_resistance = resistance.value() + response.ground_resistance(elapsed);
    base.plus(kelvin_interval(peak_load * total_resistance))
}

/// Undisturbed ground temperature at mid-depth of a borehole.
///
/// `T0 = T_surface + (q_geo / k_s)·H/2`, with `q_geo` the geothermal heat flux.
#[must_use]
pub fn effective_ground_temperature(
    surface: ThermodynamicTemperature,
    geothermal_flux: HeatFluxDensity,
    conductivity: Constrained<ThermalConductivity, StrictlyPositive>,
    depth: Length,
) -> ThermodynamicTemperature {
    let gradient = geothermal_flux.get::<watt_per_square_meter>()
        / conductivity.get().get::<watt_per_meter_kelvin>();
    let rise = gradient * depth.get::<meter>() / 2.0;
    surface.plus(TemperatureInterval::new::<delta_kelvin>(rise))
}

/// Characteristic time `t_s = H² / (9α)` of a borehole of depth `H`.
///
/// `α = k_s / (ρ_s·c_s)` is the ground thermal diffusivity. g-functions are
/// usually tabulated against `ln(t / t_s)`.
#[must_use]
pub fn characteristic_time(
    depth: Constrained<Length, StrictlyPositive>,
    conductivity: Constrained<ThermalConductivity, StrictlyPositive>,
    density: Constrained<MassDensity, StrictlyPositive>,
    specific_heat: Constrained<SpecificHeatCapacity, StrictlyPositive>,
) -> Time {
    let h = depth.get().get::<meter>();
    let diffusivity = conductivity.get().get::<watt_per_meter_kelvin>()
        / (density.get().get::<kilogram_per_cubic_meter>()
            * specific_heat.get().get::<joule_per_kilogram_kelvin>());
    Time::new::<second>(h * h / (9.0 * diffusivity))
}

/// Positions of an `nx × ny` rectangular field, in row-major order.
///
/// The first borehole sits at the origin; columns advance along `+x` by
/// `spacing_x` and rows along `+y` by `spacing_y`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rectangular_field(
    nx: usize,
    ny: usize,
    spacing_x: Length,
    spacing_y: Length,
) -> Vec<Position> {
    let bx = spacing_x.get::<meter>();
    let by = spacing_y.get::<meter>();
    (0..ny)
        .flat_map(|j| (0..nx).map(move |i| Position::new(i as f64 * bx, j as f64 * by)))
        .collect()
}
