//! Where and when a response is observed.
//!
//! An [`ObservationRequest`] is either a time series at one location or a
//! snapshot of many locations at one time. The two shapes are resolved here,
//! at the API boundary, so kernels and the superposition engine never have to
//! guess how scalars and sequences broadcast against each other.
//!
//! ```
//! use twine_geothermal::support::observation::{ObservationError, ObservationRequest, Position};
//!
//! let here = Position::new(1.0, 0.0);
//! let there = Position::new(0.0, 1.0);
//!
//! // One time, many locations: a snapshot.
//! let request = ObservationRequest::new(&[3.15e7], &[here, there]).unwrap();
//! assert!(matches!(request, ObservationRequest::Snapshot { .. }));
//!
//! // Many times and many locations is ambiguous.
//! let ambiguous = ObservationRequest::new(&[1.0, 2.0], &[here, there]);
//! assert_eq!(
//!     ambiguous.unwrap_err(),
//!     ObservationError::AmbiguousShape { times: 2, locations: 2 }
//! );
//! ```

use thiserror::Error;

/// A point in the horizontal plane, in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `(self.x - origin.x, self.y - origin.y)`.
    #[must_use]
    pub fn offset_from(self, origin: Position) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// Errors raised while building an [`ObservationRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    /// Several times and several locations were requested at once.
    #[error("cannot observe {times} times at {locations} locations; use one time or one location")]
    AmbiguousShape { times: usize, locations: usize },

    /// No times or no locations were given.
    #[error("observation request is empty")]
    Empty,

    /// Observation times must strictly increase.
    #[error("observation time {index} does not increase")]
    NotIncreasing { index: usize },

    /// An observation time is `NaN` or infinite.
    #[error("observation time {index} is not finite")]
    NonFinite { index: usize },
}

/// A validated observation request.
///
/// Times are in seconds since the start of the load history.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationRequest<L> {
    /// Strictly increasing times at a single location.
    TimeSeries { times: Vec<f64>, location: L },

    /// A single time at one or more locations.
    Snapshot { time: f64, locations: Vec<L> },
}

impl<L: Copy> ObservationRequest<L> {
    /// Resolves a request from plain slices.
    ///
    /// A single time gives a [`Snapshot`](Self::Snapshot) (even for a single
    /// location); several times with one location give a
    /// [`TimeSeries`](Self::TimeSeries).
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError::AmbiguousShape`] if both slices hold more
    /// than one element, [`ObservationError::Empty`] if either is empty, and
    /// the time-validation errors of [`ObservationRequest::time_series`].
    pub fn new(times: &[f64], locations: &[L]) -> Result<Self, ObservationError> {
        match (times, locations) {
            ([], _) | (_, []) => Err(ObservationError::Empty),
            (&[time], _) => Self::snapshot(time, locations.to_vec()),
            (_, &[location]) => Self::time_series(times.to_vec(), location),
            _ => Err(ObservationError::AmbiguousShape {
                times: times.len(),
                locations: locations.len(),
            }),
        }
    }

    /// Builds a time-series request.
    ///
    /// # Errors
    ///
    /// Returns an [`ObservationError`] if `times` is empty, contains a
    /// non-finite value, or is not strictly increasing.
    pub fn time_series(times: Vec<f64>, location: L) -> Result<Self, ObservationError> {
        validate_times(&times)?;
        Ok(Self::TimeSeries { times, location })
    }

    /// Builds a snapshot request.
    ///
    /// # Errors
    ///
    /// Returns an [`ObservationError`] if `locations` is empty or `time` is
    /// not finite.
    pub fn snapshot(time: f64, locations: Vec<L>) -> Result<Self, ObservationError> {
        if locations.is_empty() {
            return Err(ObservationError::Empty);
        }
        if !time.is_finite() {
            return Err(ObservationError::NonFinite { index: 0 });
        }
        Ok(Self::Snapshot { time, locations })
    }

    /// Number of values the request produces.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::TimeSeries { times, .. } => times.len(),
            Self::Snapshot { locations, .. } => locations.len(),
        }
    }

    /// Always `false` for a validated request.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The latest requested time.
    #[must_use]
    pub fn latest_time(&self) -> f64 {
        match self {
            Self::TimeSeries { times, .. } => times.last().copied().unwrap_or(f64::NEG_INFINITY),
            Self::Snapshot { time, .. } => *time,
        }
    }
}

/// Checks that `times` is non-empty, finite, and strictly increasing.
pub(crate) fn validate_times(times: &[f64]) -> Result<(), ObservationError> {
    if times.is_empty() {
        return Err(ObservationError::Empty);
    }
    for (index, &time) in times.iter().enumerate() {
        if !time.is_finite() {
            return Err(ObservationError::NonFinite { index });
        }
        if index > 0 && time <= times[index - 1] {
            return Err(ObservationError::NotIncreasing { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_time_series() {
        let here = Position::new(2.0, -1.0);
        let request = ObservationRequest::new(&[1.0, 2.0, 3.0], &[here]).unwrap();
        assert_eq!(
            request,
            ObservationRequest::TimeSeries {
                times: vec![1.0, 2.0, 3.0],
                location: here
            }
        );
        assert_eq!(request.len(), 3);
        assert_eq!(request.latest_time(), 3.0);
    }

    #[test]
    fn single_time_and_location_is_a_snapshot() {
        let request = ObservationRequest::new(&[5.0], &[()]).unwrap();
        assert_eq!(
            request,
            ObservationRequest::Snapshot {
                time: 5.0,
                locations: vec![()]
            }
        );
    }

    #[test]
    fn rejects_both_plural_every_time() {
        let locations = [Position::new(0.0, 0.0), Position::new(1.0, 0.0)];
        for _ in 0..3 {
            assert_eq!(
                ObservationRequest::new(&[1.0, 2.0, 3.0], &locations),
                Err(ObservationError::AmbiguousShape {
                    times: 3,
                    locations: 2
                })
            );
        }
    }

    #[test]
    fn rejects_empty_and_unordered() {
        assert_eq!(
            ObservationRequest::<()>::new(&[], &[()]),
            Err(ObservationError::Empty)
        );
        assert_eq!(
            ObservationRequest::<()>::new(&[1.0], &[]),
            Err(ObservationError::Empty)
        );
        assert_eq!(
            ObservationRequest::time_series(vec![1.0, 1.0], ()),
            Err(ObservationError::NotIncreasing { index: 1 })
        );
        assert_eq!(
            ObservationRequest::time_series(vec![1.0, f64::INFINITY], ()),
            Err(ObservationError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn offsets() {
        let observer = Position::new(3.0, 4.0);
        assert_eq!(observer.offset_from(Position::new(1.0, 1.0)), (2.0, 3.0));
    }
}
