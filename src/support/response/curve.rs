use thiserror::Error;

/// Errors raised while building a [`ResponseCurve`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseCurveError {
    /// Interpolation needs at least two samples.
    #[error("response curve needs at least 2 samples, got {count}")]
    TooFewSamples { count: usize },

    /// Time and value columns differ in length.
    #[error("response curve has {times} times but {values} values")]
    LengthMismatch { times: usize, values: usize },

    /// A sample time is zero or negative, so its logarithm is undefined.
    #[error("sample {index} has non-positive time {time}")]
    NonPositiveTime { index: usize, time: f64 },

    /// Sample times must strictly increase.
    #[error("sample {index} does not increase in time")]
    NotIncreasing { index: usize },

    /// A sample time or value is `NaN` or infinite.
    #[error("sample {index} is not finite")]
    NonFinite { index: usize },
}

/// Tabulated unit response `g(t)` of a borehole field.
///
/// Samples come from an external g-function solver. Between samples the curve
/// is linear in `ln(t)`; outside the tabulated range the first or last segment
/// is extended, so queries never fail once the curve exists.
///
/// The curve is immutable after construction and safe to share.
///
/// # Example
///
/// ```
/// use twine_geothermal::support::response::ResponseCurve;
///
/// let curve = ResponseCurve::new([(1.0e3, 1.0), (1.0e5, 3.0)]).unwrap();
///
/// // Halfway in log-time.
/// assert!((curve.value_at(1.0e4) - 2.0).abs() < 1e-12);
///
/// // Linear extrapolation in log-time past the last sample.
/// assert!((curve.value_at(1.0e6) - 4.0).abs() < 1e-12);
///
/// // No response before the step.
/// assert_eq!(curve.value_at(0.0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    times: Vec<f64>,
    ln_times: Vec<f64>,
    values: Vec<f64>,
}

impl ResponseCurve {
    /// Builds a curve from `(time, value)` samples, time in seconds.
    ///
    /// # Errors
    ///
    /// Returns a [`ResponseCurveError`] if there are fewer than two samples,
    /// or if any sample is non-finite, non-positive in time, or out of order.
    pub fn new(samples: impl IntoIterator<Item = (f64, f64)>) -> Result<Self, ResponseCurveError> {
        let (times, values): (Vec<f64>, Vec<f64>) = samples.into_iter().unzip();
        Self::from_columns(times, values)
    }

    /// Builds a curve from separate time and value columns.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ResponseCurve::new`], plus a length mismatch.
    pub fn from_columns(times: Vec<f64>, values: Vec<f64>) -> Result<Self, ResponseCurveError> {
        if times.len() != values.len() {
            return Err(ResponseCurveError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.len() < 2 {
            return Err(ResponseCurveError::TooFewSamples { count: times.len() });
        }

        for (index, (&time, &value)) in times.iter().zip(&values).enumerate() {
            if !time.is_finite() || !value.is_finite() {
                return Err(ResponseCurveError::NonFinite { index });
            }
            if time <= 0.0 {
                return Err(ResponseCurveError::NonPositiveTime { index, time });
            }
            if index > 0 && time <= times[index - 1] {
                return Err(ResponseCurveError::NotIncreasing { index });
            }
        }

        let ln_times = times.iter().map(|t| t.ln()).collect();

        Ok(Self {
            times,
            ln_times,
            values,
        })
    }

    /// Returns the interpolated response `elapsed` seconds after a unit step.
    ///
    /// Returns zero for `elapsed <= 0`.
    #[must_use]
    pub fn value_at(&self, elapsed: f64) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }

        let x = elapsed.ln();
        let n = self.ln_times.len();

        // Index of the segment's left sample, clamped so that points outside
        // the table reuse the first or last segment.
        let upper = self
            .ln_times
            .partition_point(|&ln_t| ln_t <= x)
            .clamp(1, n - 1);
        let lower = upper - 1;

        let (x0, x1) = (self.ln_times[lower], self.ln_times[upper]);
        let (y0, y1) = (self.values[lower], self.values[upper]);

        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Sample times, in seconds.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`; a curve has at least two samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn curve() -> ResponseCurve {
        ResponseCurve::new([(100.0, 0.5), (1.0e4, 2.5), (1.0e6, 4.5), (1.0e8, 5.5)]).unwrap()
    }

    #[test]
    fn reproduces_samples() {
        let curve = curve();
        for (&t, &g) in curve.times().iter().zip(curve.values()) {
            assert_relative_eq!(curve.value_at(t), g, epsilon = 1e-12);
        }
    }

    #[test]
    fn interpolates_in_log_time() {
        let curve = curve();
        // One decade past 1e4 is halfway to 1e6 in ln(t).
        assert_relative_eq!(curve.value_at(1.0e5), 3.5, epsilon = 1e-12);
        assert_relative_eq!(curve.value_at(1.0e7), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn extrapolates_from_end_segments() {
        let curve = curve();
        // First segment slope: 2.0 per two decades.
        assert_relative_eq!(curve.value_at(10.0), -0.5, epsilon = 1e-12);
        // Last segment slope: 1.0 per two decades.
        assert_relative_eq!(curve.value_at(1.0e10), 6.5, epsilon = 1e-12);
    }

    #[test]
    fn no_response_without_elapsed_time() {
        let curve = curve();
        assert_eq!(curve.value_at(0.0), 0.0);
        assert_eq!(curve.value_at(-3600.0), 0.0);
    }

    #[test]
    fn rejects_invalid_samples() {
        assert_eq!(
            ResponseCurve::new([(1.0, 1.0)]),
            Err(ResponseCurveError::TooFewSamples { count: 1 })
        );
        assert_eq!(
            ResponseCurve::new([(0.0, 1.0), (1.0, 2.0)]),
            Err(ResponseCurveError::NonPositiveTime {
                index: 0,
                time: 0.0
            })
        );
        assert_eq!(
            ResponseCurve::new([(10.0, 1.0), (10.0, 2.0)]),
            Err(ResponseCurveError::NotIncreasing { index: 1 })
        );
        assert_eq!(
            ResponseCurve::new([(10.0, 1.0), (20.0, f64::NAN)]),
            Err(ResponseCurveError::NonFinite { index: 1 })
        );
        assert_eq!(
            ResponseCurve::from_columns(vec![1.0, 2.0], vec![1.0]),
            Err(ResponseCurveError::LengthMismatch {
                times: 2,
                values: 1
            })
        );
    }
}
