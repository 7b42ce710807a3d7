// self
use crate::{auth::TokenKind, oauth::GrantType, obs::GrantOutcome};

/// Records a grant outcome via the global metrics recorder (when enabled).
pub fn record_grant_outcome(grant: GrantType, outcome: GrantOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_issuer_grant_total",
			"grant" => grant.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}

/// Records how many expired tokens of `kind` a sweep removed.
pub fn record_tokens_swept(kind: TokenKind, count: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_issuer_tokens_swept_total", "kind" => kind.as_str())
			.increment(count as u64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, count);
	}
}
