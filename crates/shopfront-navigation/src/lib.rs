//! Shopfront Navigation Guard
//!
//! Serializes route transitions on top of a router whose transitions are
//! asynchronous and may be cancelled when superseded:
//! ```text
//! Idle
//!   ↓ navigate
//! InFlight ── request while in flight ──→ pending (latest wins)
//!   ↓ success | cancelled (retry once) | error | fallback timeout
//! Idle  → pending request, if any, is dispatched
//! ```
//! Route lifecycle events from the router feed the same state machine.

mod error;
mod guard;
mod request;
mod router;
mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::NavigationError;
pub use guard::{GuardPolicy, NavigationGuard};
pub use request::{NavigationMode, NavigationRequest};
pub use router::{RouteEvent, Router};

pub type Result<T> = std::result::Result<T, NavigationError>;
