//! Recovery banner
//!
//! The dismissible banner shown when an operation surfaces an error. It owns
//! no rendering; the UI reads a `BannerView` and calls back into it.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

use shopfront_faults::{ClassifiedError, ErrorKind, Fault, Remediation};
use shopfront_health::{attempt_recovery, HealthMonitor, Probe, RecoveryOutcome};

type Callback = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerAction {
    ToggleSolutions,
    TryRecovery,
    Dismiss,
}

/// Snapshot of everything the banner renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerView {
    pub kind: ErrorKind,
    pub title: &'static str,
    pub message: String,
    pub toggle_label: &'static str,
    /// Present while the solutions panel is open
    pub solutions: Option<&'static [&'static str]>,
    pub quick_fix: Option<String>,
    pub actions: Vec<BannerAction>,
    pub recovering: bool,
}

pub struct RecoveryBanner {
    error: ClassifiedError,
    remediation: Remediation,
    show_solutions: bool,
    recovering: AtomicBool,
    on_recover: Option<Callback>,
    on_dismiss: Option<Callback>,
}

impl RecoveryBanner {
    pub fn new<F: Fault + ?Sized>(fault: &F) -> Self {
        let error = ClassifiedError::from_fault(fault);
        let remediation = shopfront_faults::remediation(error.kind);
        Self {
            error,
            remediation,
            show_solutions: false,
            recovering: AtomicBool::new(false),
            on_recover: None,
            on_dismiss: None,
        }
    }

    /// Enables "Try Recovery". `callback` runs only after a successful recovery.
    pub fn on_recover(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_recover = Some(Box::new(callback));
        self
    }

    /// Enables "Dismiss".
    pub fn on_dismiss(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_dismiss = Some(Box::new(callback));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind
    }

    pub fn is_recovering(&self) -> bool {
        self.recovering.load(Ordering::SeqCst)
    }

    pub fn actions(&self) -> Vec<BannerAction> {
        let mut actions = vec![BannerAction::ToggleSolutions];
        if self.on_recover.is_some() {
            actions.push(BannerAction::TryRecovery);
        }
        if self.on_dismiss.is_some() {
            actions.push(BannerAction::Dismiss);
        }
        actions
    }

    /// Returns whether the panel is now open.
    pub fn toggle_solutions(&mut self) -> bool {
        self.show_solutions = !self.show_solutions;
        self.show_solutions
    }

    pub fn view(&self) -> BannerView {
        BannerView {
            kind: self.error.kind,
            title: self.remediation.title,
            message: self.error.raw_message.clone(),
            toggle_label: if self.show_solutions {
                "Hide Solutions"
            } else {
                "Show Solutions"
            },
            solutions: self.show_solutions.then_some(self.remediation.solutions),
            quick_fix: self
                .show_solutions
                .then(|| self.remediation.quick_fix.clone())
                .flatten(),
            actions: self.actions(),
            recovering: self.is_recovering(),
        }
    }

    /// Run connection recovery. Returns `None` when the banner has no recover
    /// action or a recovery is already running.
    pub async fn try_recovery<P: Probe>(
        &self,
        monitor: &HealthMonitor<P>,
    ) -> Option<RecoveryOutcome> {
        let callback = self.on_recover.as_ref()?;

        if self
            .recovering
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Recovery already running");
            return None;
        }
        let _running = Running(&self.recovering);

        let outcome = attempt_recovery(monitor).await;
        if outcome.recovered {
            tracing::info!(kind = %self.error.kind, "Error recovery successful");
            callback();
        } else {
            tracing::error!(kind = %self.error.kind, "Recovery attempt failed");
        }

        Some(outcome)
    }

    /// Returns false when the banner has no dismiss action.
    pub fn dismiss(&self) -> bool {
        match &self.on_dismiss {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

/// Clears the recovering flag when the attempt ends, however it ends.
struct Running<'a>(&'a AtomicBool);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
