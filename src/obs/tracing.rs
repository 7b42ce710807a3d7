// self
use crate::{_prelude::*, auth::TokenKind, oauth::GrantType, store::StoreError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedGrant<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedGrant<F> = F;

/// Span wrapping one dispatcher call.
#[derive(Clone, Debug)]
pub struct GrantSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl GrantSpan {
	/// Creates a new span tagged with the provided grant type + stage.
	pub fn new(grant: GrantType, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_issuer.grant", grant = grant.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (grant, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedGrant<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warning for a sweep that failed; the next tick retries it.
pub fn record_sweep_failure(kind: TokenKind, error: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(kind = kind.as_str(), error = %error, "Failed to delete expired tokens.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}
