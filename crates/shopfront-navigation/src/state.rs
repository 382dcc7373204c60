//! Guard state machine
//!
//! The single owner of the in-flight flag. The call path and the router's
//! event stream both feed it; every attempt gets a generation number so an
//! outcome that arrives after its attempt was settled is recognised as stale.
//!
//! Invariant: `Idle ⇒ pending == None`.

use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::request::{NavigationMode, NavigationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Started by the guard itself
    Guard,
    /// Observed through route events only
    External,
}

#[derive(Debug)]
pub(crate) struct Attempt {
    pub generation: u64,
    pub request: NavigationRequest,
    pub origin: Origin,
    /// Wakes the caller waiting on this attempt when the guard gives up on it
    pub abandon: Arc<Notify>,
}

impl Attempt {
    /// Whether a route event for `path` finishes this attempt.
    ///
    /// Failures of push/replace attempts started by the guard are left to the
    /// call path, which owns the cancellation retry.
    pub fn settled_by(&self, path: &str, failed: bool) -> bool {
        match (self.origin, self.request.mode) {
            (Origin::External, _) | (Origin::Guard, NavigationMode::Back) => true,
            (Origin::Guard, _) => !failed && self.request.target_path == path,
        }
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    InFlight(Attempt),
}

#[derive(Debug)]
pub(crate) enum Admission {
    Admitted {
        generation: u64,
        abandon: Arc<Notify>,
    },
    Queued {
        superseded: Option<NavigationRequest>,
    },
}

#[derive(Debug)]
pub(crate) enum Settlement {
    Settled {
        attempt: Attempt,
        pending: Option<NavigationRequest>,
    },
    Stale,
}

#[derive(Debug)]
pub(crate) struct GuardState {
    phase: Phase,
    pending: Option<NavigationRequest>,
    fallback: Option<JoinHandle<()>>,
    next_generation: u64,
    /// Target of the last guard-started transition whose `Started` event
    /// has not been seen yet
    unechoed: Option<String>,
}

impl GuardState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
            fallback: None,
            next_generation: 0,
            unechoed: None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::InFlight(_))
    }

    pub fn current(&self) -> Option<&Attempt> {
        match &self.phase {
            Phase::InFlight(attempt) => Some(attempt),
            Phase::Idle => None,
        }
    }

    pub fn pending(&self) -> Option<&NavigationRequest> {
        self.pending.as_ref()
    }

    /// Start an attempt, or queue the request behind the one in flight.
    pub fn admit(&mut self, request: NavigationRequest, origin: Origin) -> Admission {
        if self.is_in_flight() {
            let superseded = self.pending.replace(request);
            return Admission::Queued { superseded };
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let abandon = Arc::new(Notify::new());

        if origin == Origin::Guard && request.mode != NavigationMode::Back {
            self.unechoed = Some(request.target_path.clone());
        }

        self.phase = Phase::InFlight(Attempt {
            generation,
            request,
            origin,
            abandon: Arc::clone(&abandon),
        });

        Admission::Admitted {
            generation,
            abandon,
        }
    }

    /// Consume the `Started` echo of a guard-started transition.
    pub fn take_echo(&mut self, path: &str) -> bool {
        if self.unechoed.as_deref() == Some(path) {
            self.unechoed = None;
            true
        } else {
            false
        }
    }

    /// Finish the attempt with `generation` if it is still the current one.
    /// Cancels the fallback timer and hands back the queued request.
    pub fn settle(&mut self, generation: u64) -> Settlement {
        match &self.phase {
            Phase::InFlight(attempt) if attempt.generation == generation => {}
            _ => return Settlement::Stale,
        }

        if let Some(timer) = self.fallback.take() {
            timer.abort();
        }

        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::InFlight(attempt) => Settlement::Settled {
                attempt,
                pending: self.pending.take(),
            },
            Phase::Idle => Settlement::Stale,
        }
    }

    /// Own the fallback timer of the current attempt, aborting any previous one.
    pub fn arm_fallback(&mut self, timer: JoinHandle<()>) {
        if let Some(previous) = self.fallback.replace(timer) {
            previous.abort();
        }
    }

    /// Forget the fallback timer without aborting it. Used by the timer itself.
    pub fn release_fallback(&mut self) {
        self.fallback.take();
    }

    /// Back to idle unconditionally.
    pub fn reset(&mut self) -> (Option<Attempt>, Option<NavigationRequest>) {
        if let Some(timer) = self.fallback.take() {
            timer.abort();
        }

        let attempt = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::InFlight(attempt) => Some(attempt),
            Phase::Idle => None,
        };

        (attempt, self.pending.take())
    }
}

impl Drop for GuardState {
    fn drop(&mut self) {
        if let Some(timer) = self.fallback.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admitted(admission: Admission) -> u64 {
        match admission {
            Admission::Admitted { generation, .. } => generation,
            Admission::Queued { .. } => panic!("Expected Admitted"),
        }
    }

    #[test]
    fn test_latest_pending_wins() {
        let mut state = GuardState::new();
        let generation = admitted(state.admit(NavigationRequest::push("/a"), Origin::Guard));

        match state.admit(NavigationRequest::push("/b"), Origin::Guard) {
            Admission::Queued { superseded } => assert!(superseded.is_none()),
            _ => panic!("Expected Queued"),
        }
        match state.admit(NavigationRequest::push("/c"), Origin::Guard) {
            Admission::Queued { superseded } => {
                assert_eq!(superseded.unwrap().target_path, "/b")
            }
            _ => panic!("Expected Queued"),
        }

        match state.settle(generation) {
            Settlement::Settled { attempt, pending } => {
                assert_eq!(attempt.request.target_path, "/a");
                assert_eq!(pending.unwrap().target_path, "/c");
            }
            Settlement::Stale => panic!("Expected Settled"),
        }

        assert!(!state.is_in_flight());
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_stale_settlement_ignored() {
        let mut state = GuardState::new();
        let first = admitted(state.admit(NavigationRequest::push("/a"), Origin::Guard));
        assert!(matches!(state.settle(first), Settlement::Settled { .. }));

        let second = admitted(state.admit(NavigationRequest::push("/b"), Origin::Guard));
        assert!(second > first);

        assert!(matches!(state.settle(first), Settlement::Stale));
        assert!(state.is_in_flight());
        assert_eq!(state.current().unwrap().request.target_path, "/b");
    }

    #[test]
    fn test_reset_drops_pending() {
        let mut state = GuardState::new();
        state.admit(NavigationRequest::push("/a"), Origin::Guard);
        state.admit(NavigationRequest::push("/b"), Origin::Guard);

        let (attempt, pending) = state.reset();
        assert_eq!(attempt.unwrap().request.target_path, "/a");
        assert_eq!(pending.unwrap().target_path, "/b");
        assert!(!state.is_in_flight());
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_event_settlement_rules() {
        let mut state = GuardState::new();
        state.admit(NavigationRequest::push("/cart"), Origin::Guard);
        let attempt = state.current().unwrap();
        assert!(attempt.settled_by("/cart", false));
        assert!(!attempt.settled_by("/shop", false));
        assert!(!attempt.settled_by("/cart", true));

        let mut state = GuardState::new();
        state.admit(NavigationRequest::push("/shop"), Origin::External);
        assert!(state.current().unwrap().settled_by("/elsewhere", true));
    }

    #[test]
    fn test_echo_consumed_once() {
        let mut state = GuardState::new();
        let generation = admitted(state.admit(NavigationRequest::push("/a"), Origin::Guard));
        state.settle(generation);

        assert!(state.take_echo("/a"));
        assert!(!state.take_echo("/a"));
    }
}
