use thiserror::Error;
use twine_core::Model;
use uom::si::{
    f64::{ThermalConductivity, ThermodynamicTemperature, Time},
    time::second,
};

use crate::support::{
    borehole::{BoreholeResistance, Calibration, PeakConfig, ground_to_fluid, peak_temperature},
    constraint::{Constrained, StrictlyPositive},
    load::SteppedLoads,
    response::{ConductionResponse, ResponseCurve},
    superposition::SuperpositionError,
};

use super::core::{assemble, conductive_perturbations};

/// Errors raised by [`GFunctionField`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GFunctionFieldError {
    /// Peak loads were given but do not match the load steps one to one.
    #[error("{peaks} peak loads for {steps} load steps")]
    PeakLengthMismatch { peaks: usize, steps: usize },

    /// A peak load is `NaN` or infinite.
    #[error("peak load {index} is not finite")]
    NonFinitePeak { index: usize },

    #[error("superposition failed")]
    Superposition(#[from] SuperpositionError),
}

/// Load steps for one [`GFunctionField`] evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct GFunctionFieldInput {
    /// Average linear load (W/m) of each step, held for its duration.
    pub loads: SteppedLoads,
    /// Optional short peak load (W/m) applied at the end of each step.
    pub peak_loads: Option<Vec<f64>>,
}

impl From<SteppedLoads> for GFunctionFieldInput {
    fn from(loads: SteppedLoads) -> Self {
        Self {
            loads,
            peak_loads: None,
        }
    }
}

/// Temperatures at the end of every load step.
#[derive(Debug, Clone, PartialEq)]
pub struct GFunctionFieldOutput {
    /// Cumulative end time of each step.
    pub end_times: Vec<Time>,
    /// Mean borehole-wall temperature.
    pub borehole_wall: Vec<ThermodynamicTemperature>,
    /// Mean fluid temperature, `T_wall + q·R_b`.
    pub fluid: Vec<ThermodynamicTemperature>,
    /// Fluid temperature corrected with the field's [`Calibration`], if any.
    pub calibrated: Option<Vec<ThermodynamicTemperature>>,
    /// Fluid temperature during the peak load, if peaks were given.
    pub peak_fluid: Option<Vec<ThermodynamicTemperature>>,
}

/// Conduction-only temperature response of a borehole field.
///
/// The field is described by its g-function, sampled as a [`ResponseCurve`]
/// against time in seconds. Loads are superposed in time at the borehole
/// wall, then carried to the fluid through the borehole resistance.
///
/// # Example
///
/// ```
/// use twine_core::Model;
/// use twine_geothermal::{
///     models::geothermal::GFunctionField,
///     support::{
///         borehole::BoreholeResistance,
///         constraint::StrictlyPositive,
///         load::{SteppedLoads, average_month},
///         response::ResponseCurve,
///     },
/// };
/// use uom::si::{
///     f64::{ThermalConductivity, ThermodynamicTemperature},
///     thermal_conductivity::watt_per_meter_kelvin,
///     thermodynamic_temperature::degree_celsius,
/// };
///
/// let curve = ResponseCurve::new([(3.6e3, 1.0), (3.15e7, 4.0), (3.15e9, 7.0)]).unwrap();
/// let field = GFunctionField::new(
///     curve,
///     StrictlyPositive::new(ThermalConductivity::new::<watt_per_meter_kelvin>(2.5)).unwrap(),
///     BoreholeResistance::new(0.1).unwrap(),
///     ThermodynamicTemperature::new::<degree_celsius>(10.0),
/// );
///
/// let loads = SteppedLoads::tiled(&[20.0, -20.0], 3, average_month()).unwrap();
/// let output = field.call(&loads.into()).unwrap();
/// assert_eq!(output.fluid.len(), 6);
/// assert!(output.fluid[0] > output.borehole_wall[0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GFunctionField {
    curve: ResponseCurve,
    conductivity: Constrained<ThermalConductivity, StrictlyPositive>,
    resistance: BoreholeResistance,
    background: ThermodynamicTemperature,
    calibration: Option<Calibration>,
    peak: PeakConfig,
}

impl GFunctionField {
    /// Creates an uncalibrated field with the default [`PeakConfig`].
    #[must_use]
    pub fn new(
        curve: ResponseCurve,
        conductivity: Constrained<ThermalConductivity, StrictlyPositive>,
        resistance: BoreholeResistance,
        background: ThermodynamicTemperature,
    ) -> Self {
        Self {
            curve,
            conductivity,
            resistance,
            background,
            calibration: None,
            peak: PeakConfig::default(),
        }
    }

    /// Adds an empirical fluid-temperature correction.
    #[must_use]
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Replaces the peak load settings.
    #[must_use]
    pub fn with_peak(mut self, peak: PeakConfig) -> Self {
        self.peak = peak;
        self
    }

    /// The conductive unit-step response of the field.
    #[must_use]
    pub fn response(&self) -> ConductionResponse<'_> {
        ConductionResponse::new(&self.curve, self.conductivity)
    }

    /// Effective borehole thermal resistance.
    #[must_use]
    pub fn resistance(&self) -> BoreholeResistance {
        self.resistance
    }

    /// Undisturbed ground temperature.
    #[must_use]
    pub fn background(&self) -> ThermodynamicTemperature {
        self.background
    }
}

impl Model for GFunctionField {
    type Input = GFunctionFieldInput;
    type Output = GFunctionFieldOutput;
    type Error = GFunctionFieldError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let loads = &input.loads;
        if let Some(peaks) = &input.peak_loads {
            if peaks.len() != loads.len() {
                return Err(GFunctionFieldError::PeakLengthMismatch {
                    peaks: peaks.len(),
                    steps: loads.len(),
                });
            }
            if let Some(index) = peaks.iter().position(|q| !q.is_finite()) {
                return Err(GFunctionFieldError::NonFinitePeak { index });
            }
        }

        let response = self.response();
        let borehole_wall = assemble(self.background, &conductive_perturbations(&response, loads)?);

        let fluid: Vec<_> = borehole_wall
            .iter()
            .zip(loads.loads())
            .map(|(&wall, &q)| ground_to_fluid(wall, q, self.resistance))
            .collect();

        let calibrated = self.calibration.map(|calibration| {
            fluid
                .iter()
                .zip(loads.loads())
                .map(|(&base, &q)| calibration.apply(base, q, self.resistance))
                .collect()
        });

        let peak_fluid = input.peak_loads.as_ref().map(|peaks| {
            fluid
                .iter()
                .zip(peaks)
                .map(|(&base, &q)| peak_temperature(base, q, self.resistance, &response, self.peak))
                .collect()
        });

        Ok(GFunctionFieldOutput {
            end_times: loads
                .end_times()
                .into_iter()
                .map(Time::new::<second>)
                .collect(),
            borehole_wall,
            fluid,
            calibrated,
            peak_fluid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        f64::TemperatureInterval, temperature_interval::kelvin as delta_kelvin,
        thermal_conductivity::watt_per_meter_kelvin, thermodynamic_temperature::degree_celsius,
    };

    use crate::support::load::average_month;

    const CONDUCTIVITY: f64 = 2.5;

    /// A g-function that saturates at 7 after a few years.
    fn saturating_curve() -> ResponseCurve {
        let samples = (0..100).map(|k| {
            let t = 10f64.powf(2.0 + 8.0 * f64::from(k) / 99.0);
            (t, 7.0 * (1.0 - (-t / 1e8).exp()))
        });
        ResponseCurve::new(samples).unwrap()
    }

    fn field() -> GFunctionField {
        GFunctionField::new(
            saturating_curve(),
            StrictlyPositive::new(ThermalConductivity::new::<watt_per_meter_kelvin>(CONDUCTIVITY))
                .unwrap(),
            BoreholeResistance::new(0.1).unwrap(),
            ThermodynamicTemperature::new::<degree_celsius>(10.0),
        )
    }

    fn seasonal_pattern() -> Vec<f64> {
        (0..12)
            .map(|month| 30.0 * (2.0 * std::f64::consts::PI * f64::from(month) / 12.0).cos())
            .collect()
    }

    fn celsius(values: &[ThermodynamicTemperature]) -> Vec<f64> {
        values.iter().map(|t| t.get::<degree_celsius>()).collect()
    }

    /// Largest month-by-month change between two consecutive years.
    fn year_over_year_change(series: &[f64], year: usize) -> f64 {
        (0..12)
            .map(|month| (series[(year + 1) * 12 + month] - series[year * 12 + month]).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn seasonal_loads_settle_into_a_periodic_cycle() {
        let loads = SteppedLoads::tiled(&seasonal_pattern(), 25, average_month()).unwrap();
        let output = field().call(&loads.into()).unwrap();
        let fluid = celsius(&output.fluid);
        assert_eq!(fluid.len(), 300);

        let early = year_over_year_change(&fluid, 0);
        let late = year_over_year_change(&fluid, 23);
        assert!(late < 0.05, "late drift {late} K");
        assert!(late < early);

        let bound = 30.0 * (0.1 + 7.0 / (2.0 * std::f64::consts::PI * CONDUCTIVITY));
        for value in &fluid {
            assert!((value - 10.0).abs() < 2.0 * bound);
        }
    }

    #[test]
    fn zero_load_gives_background() {
        let loads = SteppedLoads::uniform(vec![0.0; 24], average_month()).unwrap();
        let output = field().call(&loads.into()).unwrap();

        for (wall, fluid) in output.borehole_wall.iter().zip(&output.fluid) {
            assert_relative_eq!(wall.get::<degree_celsius>(), 10.0, epsilon = 1e-12);
            assert_relative_eq!(fluid.get::<degree_celsius>(), 10.0, epsilon = 1e-12);
        }
        assert!(output.calibrated.is_none());
        assert!(output.peak_fluid.is_none());
    }

    #[test]
    fn constant_load_follows_the_g_function() {
        let field = field();
        let loads = SteppedLoads::uniform(vec![25.0; 4], average_month()).unwrap();
        let output = field.call(&loads.clone().into()).unwrap();

        let response = field.response();
        for ((time, wall), fluid) in output
            .end_times
            .iter()
            .zip(&output.borehole_wall)
            .zip(&output.fluid)
        {
            let expected = 10.0 + 25.0 * response.ground_resistance(time.get::<second>());
            assert_relative_eq!(wall.get::<degree_celsius>(), expected, max_relative = 1e-12);
            assert_relative_eq!(
                fluid.get::<degree_celsius>(),
                expected + 25.0 * 0.1,
                max_relative = 1e-12
            );
        }

        let last = output.end_times[3].get::<second>();
        assert_relative_eq!(last, 4.0 * average_month().get::<second>(), max_relative = 1e-12);
    }

    #[test]
    fn calibration_and_peaks_are_reported_when_requested() {
        let calibration = Calibration {
            resistance_factor: 1.0,
            offset: TemperatureInterval::new::<delta_kelvin>(0.5),
        };
        let field = field().with_calibration(calibration);

        let loads = SteppedLoads::uniform(vec![20.0, -10.0], average_month()).unwrap();
        let input = GFunctionFieldInput {
            loads,
            peak_loads: Some(vec![0.0, -40.0]),
        };
        let output = field.call(&input).unwrap();

        let fluid = celsius(&output.fluid);
        let calibrated = celsius(output.calibrated.as_deref().unwrap());
        for (base, corrected) in fluid.iter().zip(&calibrated) {
            assert_relative_eq!(*corrected, base + 0.5, epsilon = 1e-9);
        }

        let peaks = celsius(output.peak_fluid.as_deref().unwrap());
        assert_relative_eq!(peaks[0], fluid[0], epsilon = 1e-9);
        assert!(peaks[1] < fluid[1]);
    }

    #[test]
    fn rejects_mismatched_peaks() {
        let loads = SteppedLoads::uniform(vec![20.0, -10.0], average_month()).unwrap();
        let input = GFunctionFieldInput {
            loads,
            peak_loads: Some(vec![5.0]),
        };
        assert_eq!(
            field().call(&input),
            Err(GFunctionFieldError::PeakLengthMismatch { peaks: 1, steps: 2 })
        );

        let loads = SteppedLoads::uniform(vec![20.0], average_month()).unwrap();
        let input = GFunctionFieldInput {
            loads,
            peak_loads: Some(vec![f64::NAN]),
        };
        assert_eq!(
            field().call(&input),
            Err(GFunctionFieldError::NonFinitePeak { index: 0 })
        );
    }
}
