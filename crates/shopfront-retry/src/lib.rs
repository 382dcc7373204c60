//! Shopfront Retry
//!
//! Retries idempotent operations (document reads, auth checks) that fail for
//! transient client-side reasons. Delay before retry `n` is
//! `base_delay * 2^(n-1)` plus uniform jitter.

mod executor;
mod jitter;
mod policy;

pub use executor::with_retry;
pub use jitter::{Jitter, NoJitter, UniformJitter};
pub use policy::RetryPolicy;
