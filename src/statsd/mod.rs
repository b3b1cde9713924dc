use crate::{MetricResult, MetricsError};

pub mod batch;
#[cfg(feature = "blocking")]
pub mod blocking;
pub mod client;
pub mod command;
pub mod format;
pub mod net;
pub mod pool;
pub mod sampling;
pub mod timer;
pub mod transport;

/// Rates closer to 1 than this are treated as 1 and never written to the wire.
pub(crate) const RATE_EPSILON: f64 = 0.000_000_01;

/// The metric kinds understood by a `StatsD` server.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// A counter, unit `c`.
    Counter,
    /// A timing in milliseconds, unit `ms`.
    Timing,
    /// A gauge, unit `g`.
    Gauge,
    /// A histogram, unit `h`.
    Histogram,
    /// A meter, unit `m`.
    Meter,
    /// A set of unique values, unit `s`.
    Set,
}

impl MetricKind {
    /// Returns the unit tag written after the `|` separator.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Counter => "c",
            Self::Timing => "ms",
            Self::Gauge => "g",
            Self::Histogram => "h",
            Self::Meter => "m",
            Self::Set => "s",
        }
    }
}

/// Sampling rate attached to counters and timings.
///
/// Always within `(0, 1]`. A rate of 1 means every observation is sent and no
/// `|@rate` suffix is written.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SampleRate {
    value: f64,
}

impl SampleRate {
    /// Send every observation.
    pub const ALWAYS: Self = Self { value: 1.0 };

    /// Creates a sample rate.
    ///
    /// # Errors
    /// Returns [`MetricsError::InvalidSampleRate`] if `value` is not in `(0, 1]`.
    pub fn new(value: f64) -> MetricResult<Self> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self { value })
        } else {
            Err(MetricsError::InvalidSampleRate(value))
        }
    }

    /// Returns the rate as a float.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.value
    }

    /// Whether this rate is 1 within the wire-format epsilon.
    #[must_use]
    pub fn is_always(self) -> bool {
        (self.value - 1.0).abs() < RATE_EPSILON
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::ALWAYS
    }
}

impl TryFrom<f64> for SampleRate {
    type Error = MetricsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A gauge observation: either an absolute value or a signed adjustment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GaugeValue {
    /// Sets the gauge. Written with 15 fraction digits.
    Absolute(f64),
    /// Adjusts the gauge. Written with an explicit sign, e.g. `+2` or `-3.5`.
    Delta(f64),
}

impl GaugeValue {
    /// Builds a gauge value from a float and a delta flag.
    #[must_use]
    pub const fn new(value: f64, is_delta: bool) -> Self {
        if is_delta {
            Self::Delta(value)
        } else {
            Self::Absolute(value)
        }
    }
}

impl From<f64> for GaugeValue {
    fn from(value: f64) -> Self {
        Self::Absolute(value)
    }
}

/// A single typed observation.
///
/// Each variant only carries the value shapes its kind accepts: counters and timings
/// take integers and may be sampled, gauges take floats with an optional delta flag,
/// histograms and meters take integers, and sets take strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric<'a> {
    /// Counter increment. `sample_rate` is `Some` for sampled observations.
    Counter {
        /// Amount to add.
        value: i64,
        /// Rate for sampled observations.
        sample_rate: Option<SampleRate>,
    },
    /// Timing in milliseconds. `sample_rate` is `Some` for sampled observations.
    Timing {
        /// Elapsed milliseconds.
        value: i64,
        /// Rate for sampled observations.
        sample_rate: Option<SampleRate>,
    },
    /// Gauge value.
    Gauge(GaugeValue),
    /// Histogram sample.
    Histogram(i64),
    /// Meter mark.
    Meter(i64),
    /// Set member.
    Set(&'a str),
}

impl<'a> Metric<'a> {
    /// Unsampled counter.
    #[must_use]
    pub const fn counter(value: i64) -> Self {
        Self::Counter {
            value,
            sample_rate: None,
        }
    }

    /// Sampled counter.
    #[must_use]
    pub const fn counter_sampled(value: i64, sample_rate: SampleRate) -> Self {
        Self::Counter {
            value,
            sample_rate: Some(sample_rate),
        }
    }

    /// Unsampled timing.
    #[must_use]
    pub const fn timing(value: i64) -> Self {
        Self::Timing {
            value,
            sample_rate: None,
        }
    }

    /// Sampled timing.
    #[must_use]
    pub const fn timing_sampled(value: i64, sample_rate: SampleRate) -> Self {
        Self::Timing {
            value,
            sample_rate: Some(sample_rate),
        }
    }

    /// Gauge from an absolute value or a delta.
    #[must_use]
    pub fn gauge(value: impl Into<GaugeValue>) -> Self {
        Self::Gauge(value.into())
    }

    /// Histogram sample.
    #[must_use]
    pub const fn histogram(value: i64) -> Self {
        Self::Histogram(value)
    }

    /// Meter mark.
    #[must_use]
    pub const fn meter(value: i64) -> Self {
        Self::Meter(value)
    }

    /// Set member.
    #[must_use]
    pub const fn set(value: &'a str) -> Self {
        Self::Set(value)
    }

    /// Returns the kind of this metric.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        match self {
            Self::Counter { .. } => MetricKind::Counter,
            Self::Timing { .. } => MetricKind::Timing,
            Self::Gauge(_) => MetricKind::Gauge,
            Self::Histogram(_) => MetricKind::Histogram,
            Self::Meter(_) => MetricKind::Meter,
            Self::Set(_) => MetricKind::Set,
        }
    }

    /// Returns the sample rate of a sampled observation, `None` otherwise.
    #[must_use]
    pub const fn sample_rate(&self) -> Option<SampleRate> {
        match self {
            Self::Counter { sample_rate, .. } | Self::Timing { sample_rate, .. } => *sample_rate,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(MetricKind::Counter.unit(), "c");
        assert_eq!(MetricKind::Timing.unit(), "ms");
        assert_eq!(MetricKind::Gauge.unit(), "g");
        assert_eq!(MetricKind::Histogram.unit(), "h");
        assert_eq!(MetricKind::Meter.unit(), "m");
        assert_eq!(MetricKind::Set.unit(), "s");
    }

    #[test]
    fn test_sample_rate_new_valid() {
        for v in [1.0, 0.5, 0.1, 0.000_1, f64::MIN_POSITIVE] {
            let rate = SampleRate::new(v).expect("should be valid");
            assert!((rate.value() - v).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_sample_rate_new_invalid() {
        for v in [0.0, -0.5, 1.000_1, 2.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(SampleRate::new(v), Err(MetricsError::InvalidSampleRate(_))),
                "{v} should be rejected"
            );
        }
    }

    #[test]
    fn test_sample_rate_is_always() {
        assert!(SampleRate::ALWAYS.is_always());
        assert!(SampleRate::default().is_always());
        assert!(SampleRate::new(1.0 - 0.000_000_001).unwrap().is_always());
        assert!(!SampleRate::new(0.999_999).unwrap().is_always());
    }

    #[test]
    fn test_metric_kind_and_rate() {
        let rate = SampleRate::new(0.5).unwrap();
        assert_eq!(Metric::counter(1).kind(), MetricKind::Counter);
        assert_eq!(Metric::counter(1).sample_rate(), None);
        assert_eq!(Metric::counter_sampled(1, rate).sample_rate(), Some(rate));
        assert_eq!(Metric::timing_sampled(1, rate).kind(), MetricKind::Timing);
        assert_eq!(Metric::gauge(1.5).kind(), MetricKind::Gauge);
        assert_eq!(Metric::gauge(GaugeValue::new(1.5, true)), Metric::Gauge(GaugeValue::Delta(1.5)));
        assert_eq!(Metric::histogram(3).sample_rate(), None);
        assert_eq!(Metric::meter(3).kind(), MetricKind::Meter);
        assert_eq!(Metric::set("a").kind(), MetricKind::Set);
    }
}
