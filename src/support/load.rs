//! Load histories and their decomposition into step increments.
//!
//! Loads are linear heat rates in W/m, positive when heat is injected into the
//! ground. A piecewise-constant history is equivalent to a sum of steps: the
//! first sample switches on at its start time, and every later sample adds the
//! difference from its predecessor. [`decompose`] performs that split and
//! drops increments too small to matter.
//!
//! Two input forms are supported:
//!
//! - [`LoadHistory`]: explicit start times shared by one or more sources.
//! - [`SteppedLoads`]: a single series with per-step durations, the natural
//!   form for monthly design loads. It converts into a [`LoadHistory`].

use thiserror::Error;
use uom::si::{
    f64::{Energy, Length, Time},
    energy::joule,
    length::meter,
    time::{day, second},
};

/// Increments with a smaller magnitude are treated as no-ops.
pub const INCREMENT_THRESHOLD: f64 = 1e-10;

/// Days in an average Gregorian month.
const DAYS_PER_MONTH: f64 = 365.25 / 12.0;

/// A step change in load, in W/m, switched on at `start` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadStep {
    pub start: f64,
    pub delta: f64,
}

/// Errors raised while building or decomposing a load history.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadHistoryError {
    /// The history has no samples.
    #[error("load history is empty")]
    Empty,

    /// The history has no sources.
    #[error("load history has no sources")]
    NoSources,

    /// A source's load series does not match the shared start times.
    #[error("source {source_index} has {loads} loads for {times} start times")]
    LengthMismatch {
        source_index: usize,
        loads: usize,
        times: usize,
    },

    /// Start times must strictly increase.
    #[error("start time {index} does not increase")]
    NotIncreasing { index: usize },

    /// A start time, duration, or load is `NaN` or infinite.
    #[error("{what} {index} is not finite")]
    NonFinite { what: &'static str, index: usize },

    /// Step durations must be strictly positive.
    #[error("step {index} has non-positive duration {duration}")]
    NonPositiveDuration { index: usize, duration: f64 },
}

/// Splits one source's load series into step increments.
///
/// `start_times[i]` is when `loads[i]` takes effect. The first step carries
/// the first load itself; each later step carries `loads[i] - loads[i - 1]`.
/// Steps with `|delta| < INCREMENT_THRESHOLD` are dropped.
///
/// ```
/// use twine_geothermal::support::load::{decompose, LoadStep};
///
/// let steps = decompose(&[0.0, 10.0, 20.0, 30.0], &[5.0, 5.0, -3.0, 0.0]).unwrap();
/// assert_eq!(
///     steps,
///     vec![
///         LoadStep { start: 0.0, delta: 5.0 },
///         LoadStep { start: 20.0, delta: -8.0 },
///         LoadStep { start: 30.0, delta: 3.0 },
///     ]
/// );
/// ```
///
/// # Errors
///
/// Returns a [`LoadHistoryError`] if the inputs are empty, differ in length,
/// contain non-finite values, or the start times do not strictly increase.
pub fn decompose(start_times: &[f64], loads: &[f64]) -> Result<Vec<LoadStep>, LoadHistoryError> {
    validate_start_times(start_times)?;
    validate_loads(0, loads, start_times.len())?;
    Ok(increments(start_times, loads))
}

/// Decomposition without validation.
fn increments(start_times: &[f64], loads: &[f64]) -> Vec<LoadStep> {
    let mut previous = 0.0;
    start_times
        .iter()
        .zip(loads)
        .filter_map(|(&start, &load)| {
            let delta = load - previous;
            previous = load;
            (delta.abs() >= INCREMENT_THRESHOLD).then_some(LoadStep { start, delta })
        })
        .collect()
}

/// Piecewise-constant loads for one or more sources on shared start times.
///
/// Sources step synchronously: every source has one load per start time.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadHistory {
    start_times: Vec<f64>,
    loads: Vec<Vec<f64>>,
}

impl LoadHistory {
    /// Builds a multi-source history.
    ///
    /// `loads[s][i]` is the load of source `s` from `start_times[i]` on.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadHistoryError`] if there are no samples or sources, a
    /// source's series has the wrong length, any value is non-finite, or the
    /// start times do not strictly increase.
    pub fn new(start_times: Vec<f64>, loads: Vec<Vec<f64>>) -> Result<Self, LoadHistoryError> {
        validate_start_times(&start_times)?;
        if loads.is_empty() {
            return Err(LoadHistoryError::NoSources);
        }
        for (source_index, series) in loads.iter().enumerate() {
            validate_loads(source_index, series, start_times.len())?;
        }
        Ok(Self { start_times, loads })
    }

    /// Builds a single-source history.
    ///
    /// # Errors
    ///
    /// Same conditions as [`LoadHistory::new`].
    pub fn single(start_times: Vec<f64>, loads: Vec<f64>) -> Result<Self, LoadHistoryError> {
        Self::new(start_times, vec![loads])
    }

    /// Shared start times, in seconds.
    #[must_use]
    pub fn start_times(&self) -> &[f64] {
        &self.start_times
    }

    /// Load series of one source, in W/m.
    ///
    /// # Panics
    ///
    /// Panics if `source` is out of range.
    #[must_use]
    pub fn loads(&self, source: usize) -> &[f64] {
        &self.loads[source]
    }

    /// Number of sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.loads.len()
    }

    /// Whether any load event happens at or before `time`.
    #[must_use]
    pub fn has_event_by(&self, time: f64) -> bool {
        self.start_times.first().is_some_and(|&first| first <= time)
    }

    /// Step increments of every source, in source order.
    #[must_use]
    pub fn steps(&self) -> Vec<Vec<LoadStep>> {
        self.loads
            .iter()
            .map(|series| increments(&self.start_times, series))
            .collect()
    }
}

/// A single-source series of loads held for given durations.
///
/// Step `i` starts when step `i - 1` ends; the first step starts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SteppedLoads {
    loads: Vec<f64>,
    durations: Vec<f64>,
}

impl SteppedLoads {
    /// Builds a series from loads (W/m) and per-step durations.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadHistoryError`] if the series is empty, lengths differ,
    /// any value is non-finite, or a duration is not strictly positive.
    pub fn new(loads: Vec<f64>, durations: Vec<Time>) -> Result<Self, LoadHistoryError> {
        let durations: Vec<f64> = durations.iter().map(|d| d.get::<second>()).collect();
        validate_loads(0, &loads, durations.len())?;
        for (index, &duration) in durations.iter().enumerate() {
            if !duration.is_finite() {
                return Err(LoadHistoryError::NonFinite {
                    what: "duration",
                    index,
                });
            }
            if duration <= 0.0 {
                return Err(LoadHistoryError::NonPositiveDuration { index, duration });
            }
        }
        Ok(Self { loads, durations })
    }

    /// Builds a series where every step lasts `duration`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`SteppedLoads::new`].
    pub fn uniform(loads: Vec<f64>, duration: Time) -> Result<Self, LoadHistoryError> {
        let durations = vec![duration; loads.len()];
        Self::new(loads, durations)
    }

    /// Repeats a seasonal pattern for `years` years.
    ///
    /// Each value of `pattern` is held for `step`; for monthly patterns use
    /// [`average_month`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`SteppedLoads::new`].
    pub fn tiled(pattern: &[f64], years: usize, step: Time) -> Result<Self, LoadHistoryError> {
        let loads = pattern
            .iter()
            .copied()
            .cycle()
            .take(pattern.len() * years)
            .collect();
        Self::uniform(loads, step)
    }

    /// Loads, in W/m.
    #[must_use]
    pub fn loads(&self) -> &[f64] {
        &self.loads
    }

    /// Step durations, in seconds.
    #[must_use]
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loads.len()
    }

    /// Always `false`; a series has at least one step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Cumulative end time of each step, in seconds.
    #[must_use]
    pub fn end_times(&self) -> Vec<f64> {
        self.durations
            .iter()
            .scan(0.0, |elapsed, duration| {
                *elapsed += duration;
                Some(*elapsed)
            })
            .collect()
    }

    /// Start time of each step, in seconds.
    ///
    /// Step `i` starts exactly when step `i - 1` ends, so a start time never
    /// rounds below the previous end.
    #[must_use]
    pub fn start_times(&self) -> Vec<f64> {
        let mut starts = Vec::with_capacity(self.len());
        starts.push(0.0);
        starts.extend(self.end_times().iter().take(self.len().saturating_sub(1)));
        starts
    }

    /// Step increments tagged with the index of the step that introduces them.
    ///
    /// Each step starts at `end[j] - duration[j]`. Increments below
    /// [`INCREMENT_THRESHOLD`] are dropped, as in [`decompose`].
    #[must_use]
    pub fn indexed_steps(&self) -> Vec<(usize, LoadStep)> {
        let mut previous = 0.0;
        self.end_times()
            .iter()
            .zip(&self.durations)
            .zip(&self.loads)
            .enumerate()
            .filter_map(|(index, ((end, duration), &load))| {
                let delta = load - previous;
                previous = load;
                (delta.abs() >= INCREMENT_THRESHOLD).then_some((
                    index,
                    LoadStep {
                        start: end - duration,
                        delta,
                    },
                ))
            })
            .collect()
    }

    /// Converts into a single-source [`LoadHistory`].
    #[must_use]
    pub fn to_history(&self) -> LoadHistory {
        LoadHistory {
            start_times: self.start_times(),
            loads: vec![self.loads.clone()],
        }
    }
}

/// Length of an average month, `365.25 / 12` days.
#[must_use]
pub fn average_month() -> Time {
    Time::new::<day>(DAYS_PER_MONTH)
}

/// Converts energy delivered over `period` by a whole field into a linear
/// load per meter of borehole, `E / period / total_length`.
///
/// ```
/// use twine_geothermal::support::load::linear_load;
/// use uom::si::{
///     energy::kilowatt_hour,
///     f64::{Energy, Length, Time},
///     length::meter,
///     time::hour,
/// };
///
/// // 19.6 MWh in a 730 h month over 40 boreholes of 147 m.
/// let q = linear_load(
///     Energy::new::<kilowatt_hour>(19_600.0),
///     Time::new::<hour>(730.0),
///     Length::new::<meter>(40.0 * 147.0),
/// );
/// assert!((q - 4.566).abs() < 1e-3);
/// ```
#[must_use]
pub fn linear_load(energy: Energy, period: Time, total_length: Length) -> f64 {
    energy.get::<joule>() / period.get::<second>() / total_length.get::<meter>()
}

/// Converts building-side loads into the ground convention.
///
/// Building loads are positive when the building needs heating, which
/// extracts heat from the ground. Ground loads are positive when heat is
/// injected, so the sign flips.
#[must_use]
pub fn ground_loads_from_building(building: &[f64]) -> Vec<f64> {
    building.iter().map(|q| -q).collect()
}

fn validate_start_times(start_times: &[f64]) -> Result<(), LoadHistoryError> {
    if start_times.is_empty() {
        return Err(LoadHistoryError::Empty);
    }
    for (index, &time) in start_times.iter().enumerate() {
        if !time.is_finite() {
            return Err(LoadHistoryError::NonFinite {
                what: "start time",
                index,
            });
        }
        if index > 0 && time <= start_times[index - 1] {
            return Err(LoadHistoryError::NotIncreasing { index });
        }
    }
    Ok(())
}

fn validate_loads(source_index: usize, loads: &[f64], times: usize) -> Result<(), LoadHistoryError> {
    if loads.is_empty() {
        return Err(LoadHistoryError::Empty);
    }
    if loads.len() != times {
        return Err(LoadHistoryError::LengthMismatch {
            source_index,
            loads: loads.len(),
            times,
        });
    }
    if let Some(index) = loads.iter().position(|q| !q.is_finite()) {
        return Err(LoadHistoryError::NonFinite { what: "load", index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::time::hour;

    #[test]
    fn first_sample_is_its_own_increment() {
        let steps = decompose(&[100.0], &[-20.0]).unwrap();
        assert_eq!(
            steps,
            vec![LoadStep {
                start: 100.0,
                delta: -20.0
            }]
        );
    }

    #[test]
    fn drops_sub_threshold_increments() {
        let steps = decompose(&[0.0, 1.0, 2.0], &[0.0, 1e-11, 1e-11]).unwrap();
        assert!(steps.is_empty());

        let steps = decompose(&[0.0, 1.0], &[1.0, 1.0 + 1e-9]).unwrap();
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn history_validates_sources() {
        assert_eq!(
            LoadHistory::new(vec![0.0, 1.0], vec![vec![1.0, 2.0], vec![1.0]]),
            Err(LoadHistoryError::LengthMismatch {
                source_index: 1,
                loads: 1,
                times: 2
            })
        );
        assert_eq!(
            LoadHistory::new(vec![0.0, 1.0], vec![]),
            Err(LoadHistoryError::NoSources)
        );
        assert_eq!(
            LoadHistory::single(vec![1.0, 0.0], vec![1.0, 2.0]),
            Err(LoadHistoryError::NotIncreasing { index: 1 })
        );
        assert_eq!(
            LoadHistory::single(vec![0.0, 1.0], vec![1.0, f64::NAN]),
            Err(LoadHistoryError::NonFinite {
                what: "load",
                index: 1
            })
        );
    }

    #[test]
    fn multi_source_steps_share_times() {
        let history =
            LoadHistory::new(vec![0.0, 10.0], vec![vec![1.0, 3.0], vec![2.0, 2.0]]).unwrap();
        let steps = history.steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[0],
            vec![
                LoadStep {
                    start: 0.0,
                    delta: 1.0
                },
                LoadStep {
                    start: 10.0,
                    delta: 2.0
                }
            ]
        );
        assert_eq!(
            steps[1],
            vec![LoadStep {
                start: 0.0,
                delta: 2.0
            }]
        );
        assert!(history.has_event_by(0.0));
        assert!(!history.has_event_by(-1.0));
    }

    #[test]
    fn stepped_loads_track_start_and_end() {
        let loads = SteppedLoads::new(
            vec![1.0, 2.0, 3.0],
            vec![
                Time::new::<second>(10.0),
                Time::new::<second>(5.0),
                Time::new::<second>(20.0),
            ],
        )
        .unwrap();

        assert_eq!(loads.end_times(), vec![10.0, 15.0, 35.0]);
        assert_eq!(loads.start_times(), vec![0.0, 10.0, 15.0]);
        assert_eq!(loads.to_history().start_times(), &[0.0, 10.0, 15.0]);
    }

    #[test]
    fn fractional_durations_start_where_the_previous_step_ends() {
        let durations = (0..50)
            .map(|i| Time::new::<second>(1000.37 + 0.1 * f64::from(i % 7)))
            .collect();
        let loads = SteppedLoads::new(vec![1.0; 50], durations).unwrap();

        let starts = loads.start_times();
        let ends = loads.end_times();
        assert_eq!(starts[0], 0.0);
        for i in 1..loads.len() {
            assert_eq!(starts[i].to_bits(), ends[i - 1].to_bits());
        }
    }

    #[test]
    fn indexed_steps_keep_their_step_index() {
        let loads = SteppedLoads::uniform(vec![2.0, 2.0, -1.0], Time::new::<second>(10.0)).unwrap();
        assert_eq!(
            loads.indexed_steps(),
            vec![
                (
                    0,
                    LoadStep {
                        start: 0.0,
                        delta: 2.0
                    }
                ),
                (
                    2,
                    LoadStep {
                        start: 20.0,
                        delta: -3.0
                    }
                ),
            ]
        );
    }

    #[test]
    fn stepped_loads_reject_bad_durations() {
        assert_eq!(
            SteppedLoads::uniform(vec![1.0], Time::new::<second>(0.0)),
            Err(LoadHistoryError::NonPositiveDuration {
                index: 0,
                duration: 0.0
            })
        );
    }

    #[test]
    fn tiles_a_seasonal_pattern() {
        let pattern = [1.0, -1.0, 0.5];
        let loads = SteppedLoads::tiled(&pattern, 3, average_month()).unwrap();
        assert_eq!(loads.len(), 9);
        assert_eq!(&loads.loads()[6..], &pattern);
        assert_relative_eq!(
            loads.end_times()[8],
            9.0 * 365.25 / 12.0 * 86_400.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn energy_to_linear_load() {
        let q = linear_load(
            Energy::new::<joule>(3.6e9),
            Time::new::<hour>(1.0),
            Length::new::<meter>(100.0),
        );
        assert_relative_eq!(q, 1.0e4);
    }

    #[test]
    fn building_loads_flip_sign() {
        assert_eq!(ground_loads_from_building(&[7.37, -19.6]), vec![-7.37, 19.6]);
    }
}
