use rand::Rng;

use super::SampleRate;

/// Decides whether a sampled observation is sent.
pub trait SampleDecider: Send + Sync {
    /// Returns true when an observation sampled at `rate` should be emitted.
    fn should_send(&self, rate: SampleRate) -> bool;
}

/// Samples with the thread-local random generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSampler;

impl SampleDecider for RandomSampler {
    fn should_send(&self, rate: SampleRate) -> bool {
        if rate.is_always() {
            return true;
        }
        rand::thread_rng().gen::<f64>() < rate.value()
    }
}

impl<F> SampleDecider for F
where
    F: Fn(SampleRate) -> bool + Send + Sync,
{
    fn should_send(&self, rate: SampleRate) -> bool {
        self(rate)
    }
}
