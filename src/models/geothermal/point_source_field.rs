use thiserror::Error;
use twine_core::Model;
use uom::si::f64::ThermodynamicTemperature;

use crate::support::{
    load::LoadHistory,
    observation::{ObservationRequest, Position},
    response::{PointSource, PointSourceConfig, PointSourceError},
    solute::{GroundwaterFlow, SoluteEquivalent, ThermalMedium},
    superposition::SuperpositionError,
};

use super::core::{advective_perturbations, assemble};

/// Errors raised by [`PointSourceField`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointSourceFieldError {
    /// The field has no source positions.
    #[error("a point-source field needs at least one source")]
    NoSources,

    /// The transport parameters do not define a valid kernel.
    #[error("invalid point-source kernel")]
    Kernel(#[from] PointSourceError),

    /// The load history or request cannot be superposed.
    #[error("superposition failed")]
    Superposition(#[from] SuperpositionError),
}

/// Loads and observations for one [`PointSourceField`] evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSourceFieldInput {
    /// Linear heat loads (W/m), one series per source, in source order.
    pub history: LoadHistory,
    pub request: ObservationRequest<Position>,
}

/// Ground temperatures around line heat sources in flowing groundwater.
///
/// Each borehole is a continuous point source in a 2D aquifer with uniform
/// flow along `+x`. Heat transport is solved as the equivalent solute problem
/// (see [`SoluteEquivalent`]), and the resulting perturbations are added to
/// the background ground temperature.
///
/// The model outputs one absolute temperature per requested time (time
/// series) or per requested location (snapshot).
#[derive(Debug, Clone, PartialEq)]
pub struct PointSourceField {
    kernel: PointSource,
    equivalent: SoluteEquivalent,
    sources: Vec<Position>,
    background: ThermodynamicTemperature,
}

impl PointSourceField {
    /// Builds a field of sources at fixed positions.
    ///
    /// # Errors
    ///
    /// Returns [`PointSourceFieldError::NoSources`] if `sources` is empty,
    /// or [`PointSourceFieldError::Kernel`] if the medium and flow do not
    /// define a valid point-source kernel.
    pub fn new(
        medium: &ThermalMedium,
        flow: &GroundwaterFlow,
        sources: Vec<Position>,
        background: ThermodynamicTemperature,
        config: PointSourceConfig,
    ) -> Result<Self, PointSourceFieldError> {
        if sources.is_empty() {
            return Err(PointSourceFieldError::NoSources);
        }

        let equivalent = SoluteEquivalent::from_thermal(medium);
        let kernel = PointSource::new(&equivalent.transport(flow), config)?;
        tracing::debug!(
            sources = sources.len(),
            retardation = equivalent.retardation,
            quadrature_order = config.quadrature_order,
            "built point-source field"
        );

        Ok(Self {
            kernel,
            equivalent,
            sources,
            background,
        })
    }

    /// The elemental kernel.
    #[must_use]
    pub fn kernel(&self) -> &PointSource {
        &self.kernel
    }

    /// Solute-transport parameters equivalent to the thermal medium.
    #[must_use]
    pub fn equivalent(&self) -> &SoluteEquivalent {
        &self.equivalent
    }

    /// Source positions, in source order.
    #[must_use]
    pub fn sources(&self) -> &[Position] {
        &self.sources
    }

    /// Undisturbed ground temperature.
    #[must_use]
    pub fn background(&self) -> ThermodynamicTemperature {
        self.background
    }
}

impl Model for PointSourceField {
    type Input = PointSourceFieldInput;
    type Output = Vec<ThermodynamicTemperature>;
    type Error = PointSourceFieldError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let perturbations = advective_perturbations(
            &self.kernel,
            &self.equivalent,
            &self.sources,
            &input.history,
            &input.request,
        )?;
        Ok(assemble(self.background, &perturbations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        f64::{MassDensity, SpecificHeatCapacity, ThermalConductivity, Velocity},
        mass_density::kilogram_per_cubic_meter,
        specific_heat_capacity::joule_per_kilogram_kelvin,
        thermal_conductivity::watt_per_meter_kelvin,
        thermodynamic_temperature::degree_celsius,
        velocity::meter_per_second,
    };

    use crate::support::{constraint::UnitIntervalOpen, solute::PhaseProperties};

    const YEAR: f64 = 365.0 * 86_400.0;

    fn sandy_aquifer() -> ThermalMedium {
        let solid = PhaseProperties::new(
            MassDensity::new::<kilogram_per_cubic_meter>(2650.0),
            SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(940.0),
            ThermalConductivity::new::<watt_per_meter_kelvin>(1.4),
        )
        .unwrap();
        ThermalMedium::with_water(UnitIntervalOpen::new(0.2).unwrap(), solid)
    }

    fn field(sources: Vec<Position>, velocity: f64) -> PointSourceField {
        PointSourceField::new(
            &sandy_aquifer(),
            &GroundwaterFlow::without_dispersion(Velocity::new::<meter_per_second>(velocity)),
            sources,
            ThermodynamicTemperature::new::<degree_celsius>(10.0),
            PointSourceConfig::default(),
        )
        .unwrap()
    }

    fn snapshot(time: f64, locations: Vec<Position>) -> ObservationRequest<Position> {
        ObservationRequest::snapshot(time, locations).unwrap()
    }

    #[test]
    fn single_source_one_meter_downstream_after_one_year() {
        let model = field(vec![Position::new(0.0, 0.0)], 1.0 / 86_400.0);
        let input = PointSourceFieldInput {
            history: LoadHistory::single(vec![0.0], vec![50.0]).unwrap(),
            request: snapshot(YEAR, vec![Position::new(1.0, 0.0)]),
        };

        let temperatures = model.call(&input).unwrap();
        assert_eq!(temperatures.len(), 1);
        assert_relative_eq!(
            temperatures[0].get::<degree_celsius>() - 10.0,
            3.958_460_826_526_927,
            max_relative = 1e-6
        );
    }

    #[test]
    fn zero_load_gives_background() {
        let model = field(vec![Position::new(0.0, 0.0)], 1.0 / 86_400.0);
        let input = PointSourceFieldInput {
            history: LoadHistory::single(vec![0.0, YEAR / 2.0], vec![0.0, 0.0]).unwrap(),
            request: ObservationRequest::time_series(vec![YEAR / 4.0, YEAR], Position::new(3.0, 1.0))
                .unwrap(),
        };

        for temperature in model.call(&input).unwrap() {
            assert_relative_eq!(temperature.get::<degree_celsius>(), 10.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn coincident_sources_add_linearly() {
        let origin = Position::new(0.0, 0.0);
        let observers = vec![Position::new(2.0, 0.0), Position::new(0.0, 2.0)];

        let single = field(vec![origin], 1e-6)
            .call(&PointSourceFieldInput {
                history: LoadHistory::single(vec![0.0], vec![40.0]).unwrap(),
                request: snapshot(YEAR, observers.clone()),
            })
            .unwrap();

        let pair = field(vec![origin, origin], 1e-6)
            .call(&PointSourceFieldInput {
                history: LoadHistory::new(vec![0.0], vec![vec![15.0], vec![25.0]]).unwrap(),
                request: snapshot(YEAR, observers),
            })
            .unwrap();

        for (a, b) in single.iter().zip(&pair) {
            assert_relative_eq!(
                a.get::<degree_celsius>(),
                b.get::<degree_celsius>(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn downstream_borehole_sees_more_heat() {
        let model = field(vec![Position::new(0.0, 0.0)], 1.0 / 86_400.0);
        let input = PointSourceFieldInput {
            history: LoadHistory::single(vec![0.0], vec![50.0]).unwrap(),
            request: snapshot(YEAR, vec![Position::new(5.0, 0.0), Position::new(-5.0, 0.0)]),
        };

        let temperatures = model.call(&input).unwrap();
        assert!(temperatures[0] > temperatures[1]);
        assert!(temperatures[1].get::<degree_celsius>() >= 10.0);
    }

    #[test]
    fn small_heat_increments_are_kept() {
        let model = field(vec![Position::new(0.0, 0.0)], 1.0 / 86_400.0);
        let at = |loads: Vec<f64>| {
            let input = PointSourceFieldInput {
                history: LoadHistory::single(vec![0.0, YEAR], loads).unwrap(),
                request: snapshot(2.0 * YEAR, vec![Position::new(1.0, 0.0)]),
            };
            model.call(&input).unwrap()[0].get::<degree_celsius>()
        };

        let steady = at(vec![50.0, 50.0]);
        let nudged = at(vec![50.0, 50.0 + 1e-4]);
        let nudge_alone = at(vec![0.0, 1e-4]) - 10.0;

        assert!(nudged - steady > 0.0);
        assert!(nudge_alone > 0.0);
        assert_relative_eq!(nudged - steady, nudge_alone, max_relative = 1e-6);
    }

    #[test]
    fn rejects_mismatched_and_non_causal_inputs() {
        let model = field(vec![Position::new(0.0, 0.0)], 1e-6);

        let mismatched = PointSourceFieldInput {
            history: LoadHistory::new(vec![0.0], vec![vec![10.0], vec![10.0]]).unwrap(),
            request: snapshot(YEAR, vec![Position::new(1.0, 0.0)]),
        };
        assert_eq!(
            model.call(&mismatched),
            Err(PointSourceFieldError::Superposition(
                SuperpositionError::SourceMismatch {
                    positions: 1,
                    sources: 2
                }
            ))
        );

        let too_early = PointSourceFieldInput {
            history: LoadHistory::single(vec![YEAR], vec![10.0]).unwrap(),
            request: snapshot(YEAR / 2.0, vec![Position::new(1.0, 0.0)]),
        };
        assert!(matches!(
            model.call(&too_early),
            Err(PointSourceFieldError::Superposition(
                SuperpositionError::NonCausal { .. }
            ))
        ));
    }

    #[test]
    fn rejects_empty_field_and_zero_order_rule() {
        let flow = GroundwaterFlow::without_dispersion(Velocity::new::<meter_per_second>(0.0));
        let background = ThermodynamicTemperature::new::<degree_celsius>(10.0);

        assert_eq!(
            PointSourceField::new(
                &sandy_aquifer(),
                &flow,
                Vec::new(),
                background,
                PointSourceConfig::default()
            ),
            Err(PointSourceFieldError::NoSources)
        );

        let config = PointSourceConfig {
            quadrature_order: 0,
        };
        assert!(matches!(
            PointSourceField::new(
                &sandy_aquifer(),
                &flow,
                vec![Position::default()],
                background,
                config
            ),
            Err(PointSourceFieldError::Kernel(PointSourceError::Quadrature(_)))
        ));
    }
}
