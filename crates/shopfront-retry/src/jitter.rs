//! Jitter sources

use rand::Rng;
use std::time::Duration;

pub trait Jitter: Send + Sync {
    /// A delay in `[0, max]`.
    fn sample(&self, max: Duration) -> Duration;
}

/// Uniformly distributed jitter from the thread-local rng.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformJitter;

impl Jitter for UniformJitter {
    fn sample(&self, max: Duration) -> Duration {
        let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&self, _max: Duration) -> Duration {
        Duration::ZERO
    }
}
