use std::f64::consts::PI;

use thiserror::Error;

use crate::support::{
    constraint::{Constrained, UnitIntervalOpen},
    observation::{ObservationRequest, Position},
};

use super::{ElementalResponse, GaussLegendre, QuadratureError};

/// Configuration for [`PointSource`] evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointSourceConfig {
    /// Gauss–Legendre order used for the time integral.
    pub quadrature_order: usize,
}

impl Default for PointSourceConfig {
    fn default() -> Self {
        Self {
            quadrature_order: 100,
        }
    }
}

/// Transport parameters of the 2D solute problem, in SI units.
///
/// Flow is uniform and along `+x`. For heat transport these values come from
/// [`crate::support::solute::SoluteEquivalent::transport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoluteTransport {
    /// Average linear groundwater velocity along `x`, in m/s.
    pub velocity: f64,
    /// Aquifer porosity.
    pub porosity: Constrained<f64, UnitIntervalOpen>,
    /// Longitudinal dispersivity `α_L`, in m.
    pub longitudinal_dispersivity: f64,
    /// Horizontal transverse dispersivity `α_T`, in m.
    pub transverse_dispersivity: f64,
    /// Effective molecular diffusion `D_m`, in m²/s.
    pub molecular_diffusion: f64,
    /// First-order decay rate `λ`, in 1/s.
    pub decay_rate: f64,
    /// Retardation factor `R`.
    pub retardation: f64,
    /// Volumetric injection rate per unit aquifer thickness `Q_a`, in m²/s.
    pub injection_rate: f64,
}

/// Errors raised while building a [`PointSource`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointSourceError {
    /// A transport parameter is `NaN` or infinite.
    #[error("transport parameter `{name}` is not finite")]
    NonFinite { name: &'static str },

    /// A transport parameter that must be non-negative is negative.
    #[error("transport parameter `{name}` is negative: {value}")]
    Negative { name: &'static str, value: f64 },

    /// The retardation factor must be strictly positive.
    #[error("retardation must be positive, got {0}")]
    Retardation(f64),

    /// A dispersion coefficient is zero, so the solution is undefined.
    #[error("dispersion coefficient along {axis} is zero; add diffusion or dispersivity")]
    NoDispersion { axis: char },

    /// The quadrature rule could not be built.
    #[error("quadrature rule")]
    Quadrature(#[from] QuadratureError),
}

/// Continuous point source in an infinite 2D aquifer with uniform flow.
///
/// Implements Wexler (1992), *Analytical solutions for one-, two-, and
/// three-dimensional solute transport in ground-water systems with uniform
/// flow*, USGS TWRI 03-B7, the `POINT2` solution:
///
/// ```text
/// C = c0 · Qa / (4nπ√(Dx·Dy)) · ∫₀ᵗ f(τ) dτ
/// f(τ) = (1/τ) · exp(−(Δx − v·τ)²/(4Dx·τ) − λ·τ − Δy²/(4Dy·τ))
/// ```
///
/// The advective factor `exp(v·Δx / (2Dx))` of the published form is kept
/// inside the exponent so it cannot overflow far downstream.
///
/// with `Dx = α_L·v + D_m` and `Dy = α_T·v + D_m`. Velocity, dispersion
/// coefficients and injection rate are all divided by the retardation factor.
///
/// The integral is evaluated with a fixed [`GaussLegendre`] rule built once at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSource {
    velocity: f64,
    dispersion_x: f64,
    dispersion_y: f64,
    porosity: f64,
    injection_rate: f64,
    decay_rate: f64,
    rule: GaussLegendre,
}

impl PointSource {
    /// Builds a point-source kernel.
    ///
    /// # Errors
    ///
    /// Returns a [`PointSourceError`] if a parameter is non-finite or
    /// negative where that is not allowed, if either dispersion coefficient is
    /// zero, or if the quadrature rule cannot be built.
    pub fn new(
        transport: &SoluteTransport,
        config: PointSourceConfig,
    ) -> Result<Self, PointSourceError> {
        let SoluteTransport {
            velocity,
            porosity,
            longitudinal_dispersivity,
            transverse_dispersivity,
            molecular_diffusion,
            decay_rate,
            retardation,
            injection_rate,
        } = *transport;

        for (name, value) in [
            ("velocity", velocity),
            ("longitudinal_dispersivity", longitudinal_dispersivity),
            ("transverse_dispersivity", transverse_dispersivity),
            ("molecular_diffusion", molecular_diffusion),
            ("decay_rate", decay_rate),
            ("retardation", retardation),
            ("injection_rate", injection_rate),
        ] {
            if !value.is_finite() {
                return Err(PointSourceError::NonFinite { name });
            }
        }

        for (name, value) in [
            ("longitudinal_dispersivity", longitudinal_dispersivity),
            ("transverse_dispersivity", transverse_dispersivity),
            ("molecular_diffusion", molecular_diffusion),
            ("decay_rate", decay_rate),
        ] {
            if value < 0.0 {
                return Err(PointSourceError::Negative { name, value });
            }
        }

        if retardation <= 0.0 {
            return Err(PointSourceError::Retardation(retardation));
        }

        // Dispersion scales with flow speed regardless of flow direction.
        let speed = velocity.abs();
        let dispersion_x = (longitudinal_dispersivity * speed + molecular_diffusion) / retardation;
        let dispersion_y = (transverse_dispersivity * speed + molecular_diffusion) / retardation;

        if dispersion_x <= 0.0 {
            return Err(PointSourceError::NoDispersion { axis: 'x' });
        }
        if dispersion_y <= 0.0 {
            return Err(PointSourceError::NoDispersion { axis: 'y' });
        }

        Ok(Self {
            velocity: velocity / retardation,
            dispersion_x,
            dispersion_y,
            porosity: porosity.into_inner(),
            injection_rate: injection_rate / retardation,
            decay_rate,
            rule: GaussLegendre::new(config.quadrature_order)?,
        })
    }

    /// Retarded velocity `v/R`, in m/s.
    #[must_use]
    pub fn retarded_velocity(&self) -> f64 {
        self.velocity
    }

    /// Retarded dispersion coefficients `(Dx/R, Dy/R)`, in m²/s.
    #[must_use]
    pub fn dispersion(&self) -> (f64, f64) {
        (self.dispersion_x, self.dispersion_y)
    }

    /// The quadrature rule in use.
    #[must_use]
    pub fn rule(&self) -> &GaussLegendre {
        &self.rule
    }

    /// Evaluates a single continuous source of strength `magnitude` switched
    /// on at `t = 0`.
    ///
    /// The request shape decides whether the result is a time series at one
    /// location or a snapshot over many locations. No sanitization is
    /// applied here; see [`crate::support::response::finite_or_zero`].
    #[must_use]
    pub fn evaluate(
        &self,
        magnitude: f64,
        source: Position,
        request: &ObservationRequest<Position>,
    ) -> Vec<f64> {
        let unit = match request {
            ObservationRequest::TimeSeries { times, location } => {
                self.respond_over_time(times, source, *location)
            }
            ObservationRequest::Snapshot { time, locations } => {
                self.respond_over_space(*time, source, locations)
            }
        };
        unit.into_iter().map(|value| magnitude * value).collect()
    }

    /// The time-domain integrand `f(τ)` for an offset `(dx, dy)`.
    fn integrand(&self, tau: f64, dx: f64, dy: f64) -> f64 {
        let ahead = dx - self.velocity * tau;
        let exponent = -(ahead * ahead) / (4.0 * self.dispersion_x * tau)
            - self.decay_rate * tau
            - dy * dy / (4.0 * self.dispersion_y * tau);

        exponent.exp() / tau
    }
}

impl ElementalResponse for PointSource {
    type Location = Position;

    fn respond(&self, elapsed: f64, source: Position, observer: Position) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }

        let (dx, dy) = observer.offset_from(source);

        let integral = self
            .rule
            .integrate(|tau| self.integrand(tau, dx, dy), 0.0, elapsed);

        let prefactor = self.injection_rate
            / (4.0 * self.porosity * PI * (self.dispersion_x * self.dispersion_y).sqrt());

        prefactor * integral
    }
}
