//! Shopfront Faults
//!
//! Raw failure signals coming out of the router, the document store and the
//! auth SDK, and the small taxonomy they are sorted into:
//! - `BlockedConnection`: an extension or proxy intercepted the request
//! - `BrowserSecurityPolicy`: cross-origin isolation warnings
//! - `NavigationCancelled`: a route transition was superseded
//! - `Generic`: everything else
//!
//! The same classification drives retry decisions and the remediation text
//! shown in the recovery banner.

mod classify;
mod failure;
mod message;
mod remediation;

pub use classify::{classify, ClassifiedError, ErrorKind};
pub use failure::{Failure, Fault};
pub use message::user_message;
pub use remediation::{remediation, Remediation, ALLOWLIST_DOMAINS};
