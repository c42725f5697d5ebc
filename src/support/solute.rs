//! Heat transport expressed as an equivalent solute-transport problem.
//!
//! Advective-dispersive heat transport in a saturated aquifer obeys the same
//! equation as a sorbing, diffusing solute once the thermal properties are
//! mapped onto solute ones:
//!
//! | Solute quantity           | Thermal equivalent                  |
//! |---------------------------|-------------------------------------|
//! | distribution coefficient  | `kd = c_s / (c_w·ρ_w)`              |
//! | bulk density              | `ρ_b = (1 − n)·ρ_s`                 |
//! | retardation factor        | `R = 1 + kd·ρ_b / n`                |
//! | molecular diffusion       | `D_m = k_0 / (n·ρ_w·c_w)`           |
//! | injected mass rate        | `q / (ρ_w·c_w)`                     |
//!
//! where `k_0 = n·k_w + (1 − n)·k_s` is the bulk thermal conductivity.
//! The reference injection rate `Q_a` is one; the load magnitude is carried
//! entirely by the injected mass rate.

use uom::si::{
    f64::{
        Frequency, Length, MassDensity, SpecificHeatCapacity, ThermalConductivity, Velocity,
    },
    frequency::hertz,
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    velocity::meter_per_second,
};

use crate::support::{
    constraint::{Constrained, ConstraintResult, NonNegative, StrictlyPositive, UnitIntervalOpen},
    response::SoluteTransport,
};

/// Reference injection rate `Q_a` used for heat, in m²/s.
pub const UNIT_INJECTION_RATE: f64 = 1.0;

/// Density, specific heat, and conductivity of one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseProperties {
    pub density: Constrained<MassDensity, StrictlyPositive>,
    pub specific_heat: Constrained<SpecificHeatCapacity, StrictlyPositive>,
    pub conductivity: Constrained<ThermalConductivity, StrictlyPositive>,
}

impl PhaseProperties {
    /// Creates phase properties from SI values.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is not strictly positive.
    pub fn new(
        density: MassDensity,
        specific_heat: SpecificHeatCapacity,
        conductivity: ThermalConductivity,
    ) -> ConstraintResult<Self> {
        Ok(Self {
            density: StrictlyPositive::new(density)?,
            specific_heat: StrictlyPositive::new(specific_heat)?,
            conductivity: StrictlyPositive::new(conductivity)?,
        })
    }

    /// Liquid water near 10 °C: `ρ = 1000 kg/m³`, `c = 4184 J/(kg·K)`,
    /// `k = 0.59 W/(m·K)`.
    #[must_use]
    pub fn water() -> Self {
        Self {
            density: Constrained::new_unchecked(MassDensity::new::<kilogram_per_cubic_meter>(
                1000.0,
            )),
            specific_heat: Constrained::new_unchecked(SpecificHeatCapacity::new::<
                joule_per_kilogram_kelvin,
            >(4184.0)),
            conductivity: Constrained::new_unchecked(ThermalConductivity::new::<
                watt_per_meter_kelvin,
            >(0.59)),
        }
    }

    fn si(&self) -> (f64, f64, f64) {
        (
            self.density.get().get::<kilogram_per_cubic_meter>(),
            self.specific_heat.get().get::<joule_per_kilogram_kelvin>(),
            self.conductivity.get().get::<watt_per_meter_kelvin>(),
        )
    }
}

/// Thermal description of a saturated porous medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalMedium {
    pub porosity: Constrained<f64, UnitIntervalOpen>,
    pub solid: PhaseProperties,
    pub water: PhaseProperties,
}

impl ThermalMedium {
    /// A medium saturated with [`PhaseProperties::water`].
    #[must_use]
    pub fn with_water(porosity: Constrained<f64, UnitIntervalOpen>, solid: PhaseProperties) -> Self {
        Self {
            porosity,
            solid,
            water: PhaseProperties::water(),
        }
    }
}

/// Groundwater flow and spreading parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundwaterFlow {
    /// Average linear velocity along `+x`.
    pub velocity: Velocity,
    pub longitudinal_dispersivity: Constrained<Length, NonNegative>,
    pub transverse_dispersivity: Constrained<Length, NonNegative>,
    /// First-order decay; zero for heat.
    pub decay_rate: Constrained<Frequency, NonNegative>,
}

impl GroundwaterFlow {
    /// Uniform flow with no mechanical dispersion and no decay.
    #[must_use]
    pub fn without_dispersion(velocity: Velocity) -> Self {
        Self {
            velocity,
            longitudinal_dispersivity: NonNegative::zero(),
            transverse_dispersivity: NonNegative::zero(),
            decay_rate: NonNegative::zero(),
        }
    }
}

/// Solute-transport parameters equivalent to a thermal medium.
///
/// All values are SI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoluteEquivalent {
    /// Distribution coefficient `kd`, in m³/kg.
    pub distribution_coefficient: f64,
    /// Bulk thermal conductivity `k_0`, in W/(m·K).
    pub bulk_conductivity: f64,
    /// Molecular diffusion analog `D_m`, in m²/s.
    pub molecular_diffusion: f64,
    /// Bulk density `ρ_b`, in kg/m³.
    pub bulk_density: f64,
    /// Retardation factor `R`.
    pub retardation: f64,
    porosity: Constrained<f64, UnitIntervalOpen>,
    water_heat_capacity: f64,
}

impl SoluteEquivalent {
    /// Maps a thermal medium onto solute-transport parameters.
    ///
    /// ```
    /// use twine_geothermal::support::{
    ///     constraint::UnitIntervalOpen,
    ///     solute::{PhaseProperties, SoluteEquivalent, ThermalMedium},
    /// };
    /// use uom::si::{
    ///     f64::{MassDensity, SpecificHeatCapacity, ThermalConductivity},
    ///     mass_density::kilogram_per_cubic_meter,
    ///     specific_heat_capacity::joule_per_kilogram_kelvin,
    ///     thermal_conductivity::watt_per_meter_kelvin,
    /// };
    ///
    /// let solid = PhaseProperties::new(
    ///     MassDensity::new::<kilogram_per_cubic_meter>(2650.0),
    ///     SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(940.0),
    ///     ThermalConductivity::new::<watt_per_meter_kelvin>(1.4),
    /// )
    /// .unwrap();
    /// let medium = ThermalMedium::with_water(UnitIntervalOpen::new(0.2).unwrap(), solid);
    ///
    /// let equivalent = SoluteEquivalent::from_thermal(&medium);
    /// assert!((equivalent.retardation - 3.3815).abs() < 1e-4);
    /// ```
    #[must_use]
    pub fn from_thermal(medium: &ThermalMedium) -> Self {
        let n = medium.porosity.get();
        let (rho_s, c_s, k_s) = medium.solid.si();
        let (rho_w, c_w, k_w) = medium.water.si();

        let water_heat_capacity = rho_w * c_w;
        let distribution_coefficient = c_s / water_heat_capacity;
        let bulk_conductivity = n * k_w + (1.0 - n) * k_s;
        let molecular_diffusion = bulk_conductivity / (n * water_heat_capacity);
        let bulk_density = (1.0 - n) * rho_s;
        let retardation = 1.0 + distribution_coefficient * bulk_density / n;

        Self {
            distribution_coefficient,
            bulk_conductivity,
            molecular_diffusion,
            bulk_density,
            retardation,
            porosity: medium.porosity,
            water_heat_capacity,
        }
    }

    /// Converts a linear heat load (W/m) into an injected "mass" rate,
    /// `q / (ρ_w·c_w)`, in K·m²/s.
    #[must_use]
    pub fn mass_rate(&self, load: f64) -> f64 {
        load / self.water_heat_capacity
    }

    /// Volumetric heat capacity of the pore water `ρ_w·c_w`, in J/(m³·K).
    #[must_use]
    pub fn water_heat_capacity(&self) -> f64 {
        self.water_heat_capacity
    }

    /// Point-source transport parameters for the given flow field.
    #[must_use]
    pub fn transport(&self, flow: &GroundwaterFlow) -> SoluteTransport {
        SoluteTransport {
            velocity: flow.velocity.get::<meter_per_second>(),
            porosity: self.porosity,
            longitudinal_dispersivity: flow.longitudinal_dispersivity.get().get::<meter>(),
            transverse_dispersivity: flow.transverse_dispersivity.get().get::<meter>(),
            molecular_diffusion: self.molecular_diffusion,
            decay_rate: flow.decay_rate.get().get::<hertz>(),
            retardation: self.retardation,
            injection_rate: UNIT_INJECTION_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn sandstone() -> PhaseProperties {
        PhaseProperties::new(
            MassDensity::new::<kilogram_per_cubic_meter>(2650.0),
            SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(940.0),
            ThermalConductivity::new::<watt_per_meter_kelvin>(1.4),
        )
        .unwrap()
    }

    #[test]
    fn maps_thermal_to_solute_parameters() {
        let medium = ThermalMedium::with_water(UnitIntervalOpen::new(0.2).unwrap(), sandstone());
        let eq = SoluteEquivalent::from_thermal(&medium);

        assert_relative_eq!(eq.distribution_coefficient, 940.0 / 4.184e6, max_relative = 1e-12);
        assert_relative_eq!(eq.bulk_conductivity, 1.238, max_relative = 1e-12);
        assert_relative_eq!(
            eq.molecular_diffusion,
            1.479_445_506_692_160_7e-6,
            max_relative = 1e-12
        );
        assert_relative_eq!(eq.bulk_density, 2120.0, max_relative = 1e-12);
        assert_relative_eq!(eq.retardation, 3.381_453_154_875_716_7, max_relative = 1e-12);
    }

    #[test]
    fn load_to_mass_rate() {
        let medium = ThermalMedium::with_water(UnitIntervalOpen::new(0.2).unwrap(), sandstone());
        let eq = SoluteEquivalent::from_thermal(&medium);
        assert_relative_eq!(eq.mass_rate(50.0), 50.0 / 4.184e6, max_relative = 1e-12);
        assert_relative_eq!(eq.mass_rate(-8.4), -8.4 / 4.184e6, max_relative = 1e-12);
    }

    #[test]
    fn transport_carries_flow_and_unit_injection() {
        let medium = ThermalMedium::with_water(UnitIntervalOpen::new(0.3).unwrap(), sandstone());
        let eq = SoluteEquivalent::from_thermal(&medium);
        let flow = GroundwaterFlow {
            velocity: Velocity::new::<meter_per_second>(1e-6),
            longitudinal_dispersivity: NonNegative::new(Length::new::<meter>(2.0)).unwrap(),
            transverse_dispersivity: NonNegative::new(Length::new::<meter>(0.2)).unwrap(),
            decay_rate: NonNegative::zero(),
        };

        let transport = eq.transport(&flow);
        assert_relative_eq!(transport.velocity, 1e-6);
        assert_relative_eq!(transport.longitudinal_dispersivity, 2.0);
        assert_relative_eq!(transport.transverse_dispersivity, 0.2);
        assert_eq!(transport.decay_rate, 0.0);
        assert_eq!(transport.injection_rate, UNIT_INJECTION_RATE);
        assert_eq!(transport.retardation, eq.retardation);
        assert_eq!(transport.porosity.get(), 0.3);
    }

    #[test]
    fn rejects_non_positive_phase_properties() {
        assert!(
            PhaseProperties::new(
                MassDensity::new::<kilogram_per_cubic_meter>(0.0),
                SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(940.0),
                ThermalConductivity::new::<watt_per_meter_kelvin>(1.4),
            )
            .is_err()
        );
    }
}
