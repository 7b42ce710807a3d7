//! Periodic deletion of expired tokens.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, auth::TokenKind, obs, store::TokenStore};

/// Shortest interval the sweeper accepts; shorter values are raised to it.
pub const MIN_SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(1);

/// Result of a single sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
	/// Expired access tokens removed.
	pub access_tokens: usize,
	/// Expired refresh tokens removed.
	pub refresh_tokens: usize,
	/// Expired authorization codes removed.
	pub authorization_codes: usize,
	/// Kinds whose deletion failed; they are retried on the next tick.
	pub failed: Vec<TokenKind>,
}
impl SweepReport {
	/// Total number of records removed.
	pub fn removed(&self) -> usize {
		self.access_tokens + self.refresh_tokens + self.authorization_codes
	}

	fn record(&mut self, kind: TokenKind, count: usize) {
		match kind {
			TokenKind::AccessToken => self.access_tokens = count,
			TokenKind::RefreshToken => self.refresh_tokens = count,
			TokenKind::AuthorizationCode => self.authorization_codes = count,
		}
	}
}

/// Deletes expired tokens of every kind on a fixed interval.
///
/// The first sweep runs immediately. Sweeps never overlap: a slow sweep delays the next
/// tick instead of queueing extra ones. Cancellation is observed between sweeps.
#[derive(Clone)]
pub struct ExpirySweeper {
	store: Arc<dyn TokenStore>,
	interval: StdDuration,
}
impl ExpirySweeper {
	/// Creates a sweeper over `store`.
	pub fn new(store: Arc<dyn TokenStore>, interval: StdDuration) -> Self {
		Self { store, interval: interval.max(MIN_SWEEP_INTERVAL) }
	}

	/// Effective interval between sweeps.
	pub fn interval(&self) -> StdDuration {
		self.interval
	}

	/// Runs one sweep against `now`. Failures are reported, not retried.
	pub async fn sweep_once(&self, now: OffsetDateTime) -> SweepReport {
		let mut report = SweepReport::default();

		for kind in TokenKind::ALL {
			match self.store.delete_expired(kind, now).await {
				Ok(count) => {
					obs::record_tokens_swept(kind, count);
					report.record(kind, count);
				},
				Err(e) => {
					obs::record_sweep_failure(kind, &e);
					report.failed.push(kind);
				},
			}
		}

		report
	}

	/// Sweeps until `cancel` fires.
	pub async fn run(self, cancel: CancellationToken) {
		let mut ticker = tokio::time::interval(self.interval);

		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => break,
				_ = ticker.tick() => {
					self.sweep_once(OffsetDateTime::now_utc()).await;
				},
			}
		}
	}

	/// Spawns [`run`](Self::run) on the current tokio runtime.
	pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
		tokio::spawn(self.run(cancel))
	}
}
impl Debug for ExpirySweeper {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ExpirySweeper").field("interval", &self.interval).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		auth::{OauthToken, ScopeSet},
		store::{MemoryStore, StoreError, StoreFuture},
	};

	struct OfflineStore;
	impl TokenStore for OfflineStore {
		fn create(&self, _: OauthToken) -> StoreFuture<'_, ()> {
			Box::pin(async { Err(StoreError::Backend { message: "offline".into() }) })
		}

		fn fetch<'a>(&'a self, _: TokenKind, _: &'a str) -> StoreFuture<'a, Option<OauthToken>> {
			Box::pin(async { Err(StoreError::Backend { message: "offline".into() }) })
		}

		fn delete<'a>(&'a self, _: TokenKind, _: &'a str) -> StoreFuture<'a, bool> {
			Box::pin(async { Err(StoreError::Backend { message: "offline".into() }) })
		}

		fn delete_expired(&self, _: TokenKind, _: OffsetDateTime) -> StoreFuture<'_, usize> {
			Box::pin(async { Err(StoreError::Backend { message: "offline".into() }) })
		}
	}

	async fn seed(store: &MemoryStore, kind: TokenKind, value: &str, expires_at: OffsetDateTime) {
		let mut builder = OauthToken::builder(kind, value)
			.scope(ScopeSet::parse("read"))
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_at(expires_at);

		if kind == TokenKind::AuthorizationCode {
			builder = builder.redirect_uri(Some(
				Url::parse("https://app.example.com/cb").expect("Redirect should parse."),
			));
		}

		TokenStore::create(store, builder.build().expect("Token fixture should build."))
			.await
			.expect("Fixture should be stored.");
	}

	#[tokio::test]
	async fn sweep_once_removes_only_expired_records() {
		let store = MemoryStore::default();
		let past = macros::datetime!(2025-01-01 00:10 UTC);
		let future = macros::datetime!(2025-01-01 05:00 UTC);

		seed(&store, TokenKind::AccessToken, "a-old", past).await;
		seed(&store, TokenKind::AccessToken, "a-new", future).await;
		seed(&store, TokenKind::RefreshToken, "r-old", past).await;
		seed(&store, TokenKind::AuthorizationCode, "c-old", past).await;

		let sweeper = ExpirySweeper::new(Arc::new(store.clone()), StdDuration::from_secs(60));
		let report = sweeper.sweep_once(macros::datetime!(2025-01-01 01:00 UTC)).await;

		assert_eq!(
			report,
			SweepReport {
				access_tokens: 1,
				refresh_tokens: 1,
				authorization_codes: 1,
				failed: Vec::new(),
			}
		);
		assert_eq!(report.removed(), 3);
		assert_eq!(store.len(TokenKind::AccessToken), 1);
		assert!(store.is_empty(TokenKind::RefreshToken));
	}

	#[tokio::test]
	async fn failures_are_reported_per_kind() {
		let sweeper = ExpirySweeper::new(Arc::new(OfflineStore), StdDuration::from_secs(60));
		let report = sweeper.sweep_once(OffsetDateTime::now_utc()).await;

		assert_eq!(report.failed, TokenKind::ALL.to_vec());
		assert_eq!(report.removed(), 0);
	}

	#[test]
	fn zero_intervals_are_raised_to_the_minimum() {
		let sweeper = ExpirySweeper::new(Arc::new(MemoryStore::default()), StdDuration::ZERO);

		assert_eq!(sweeper.interval(), MIN_SWEEP_INTERVAL);
	}

	#[tokio::test(start_paused = true)]
	async fn run_sweeps_immediately_and_stops_on_cancel() {
		let store = MemoryStore::default();

		seed(&store, TokenKind::AccessToken, "a-old", macros::datetime!(2025-01-01 00:10 UTC))
			.await;

		let cancel = CancellationToken::new();
		let handle = ExpirySweeper::new(Arc::new(store.clone()), StdDuration::from_secs(60))
			.spawn(cancel.clone());

		tokio::time::sleep(StdDuration::from_millis(10)).await;

		assert!(store.is_empty(TokenKind::AccessToken));

		cancel.cancel();
		handle.await.expect("Sweeper task should exit cleanly.");
	}
}
