//! Shared superposition pipeline behind the geothermal adapters.

use uom::si::f64::ThermodynamicTemperature;

use crate::support::{
    load::{LoadHistory, SteppedLoads},
    observation::{ObservationRequest, Position},
    response::{ConductionResponse, ElementalResponse, PointSource},
    solute::SoluteEquivalent,
    superposition::{SourceField, Superposition, SuperpositionError},
    units::{TemperatureShift, kelvin_interval},
};

/// A point-source kernel driven by heat loads in W/m.
///
/// The injected mass rate per watt, `1 / (ρ_w·c_w)`, is folded into the
/// kernel so loads are decomposed in W/m and the increment threshold applies
/// to heat loads.
struct HeatDriven<'a> {
    kernel: &'a PointSource,
    mass_rate_per_watt: f64,
}

impl ElementalResponse for HeatDriven<'_> {
    type Location = Position;

    fn respond(&self, elapsed: f64, source: Position, observer: Position) -> f64 {
        self.mass_rate_per_watt * self.kernel.respond(elapsed, source, observer)
    }
}

/// Ground temperature perturbations, in kelvin, from heat loads on a field of
/// point sources.
pub(super) fn advective_perturbations(
    kernel: &PointSource,
    equivalent: &SoluteEquivalent,
    sources: &[Position],
    history: &LoadHistory,
    request: &ObservationRequest<Position>,
) -> Result<Vec<f64>, SuperpositionError> {
    let field = SourceField::new(sources.to_vec(), history.clone())?;
    let response = HeatDriven {
        kernel,
        mass_rate_per_watt: equivalent.mass_rate(1.0),
    };
    Superposition::new(&response).evaluate(&field, request)
}

/// Borehole-wall perturbations, in kelvin, at the end of every load step.
pub(super) fn conductive_perturbations(
    response: &ConductionResponse<'_>,
    loads: &SteppedLoads,
) -> Result<Vec<f64>, SuperpositionError> {
    Superposition::new(response).step_ends(loads, ())
}

/// Adds perturbations to a background temperature.
pub(super) fn assemble(
    background: ThermodynamicTemperature,
    perturbations: &[f64],
) -> Vec<ThermodynamicTemperature> {
    tracing::trace!(count = perturbations.len(), "assembling temperatures");
    perturbations
        .iter()
        .map(|&delta| background.plus(kelvin_interval(delta)))
        .collect()
}
