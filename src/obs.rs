//! Optional observability helpers for the token endpoint and the expiry sweeper.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_issuer.grant` with the `grant` and
//!   `stage` (call site) fields, plus a warning event whenever a sweep fails.
//! - Enable `metrics` to increment the `oauth2_issuer_grant_total` counter for every
//!   attempt/success/failure, labeled by `grant` + `outcome`, and the
//!   `oauth2_issuer_tokens_swept_total` counter labeled by `kind`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each grant attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantOutcome {
	/// Entry to the dispatcher.
	Attempt,
	/// Tokens were issued.
	Success,
	/// An error response was produced.
	Failure,
}
impl GrantOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantOutcome::Attempt => "attempt",
			GrantOutcome::Success => "success",
			GrantOutcome::Failure => "failure",
		}
	}
}
impl Display for GrantOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
