//! Storage ports for tokens and clients, plus the in-memory reference store.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Client, ClientId, OauthToken, TokenKind},
};

/// Boxed future returned by every store operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for access tokens, refresh tokens, and authorization codes.
///
/// Each [`TokenKind`] is an independent table keyed by token value.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists a new record; a value already present in the kind's table yields
	/// [`StoreError::Conflict`].
	fn create(&self, token: OauthToken) -> StoreFuture<'_, ()>;

	/// Fetches a record by kind and value.
	fn fetch<'a>(&'a self, kind: TokenKind, value: &'a str) -> StoreFuture<'a, Option<OauthToken>>;

	/// Deletes a record; returns `true` if something was removed.
	fn delete<'a>(&'a self, kind: TokenKind, value: &'a str) -> StoreFuture<'a, bool>;

	/// Deletes every record of `kind` expired at `now`; returns the number removed.
	fn delete_expired(&self, kind: TokenKind, now: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Lookup and registration of OAuth clients.
pub trait ClientStore
where
	Self: Send + Sync,
{
	/// Fetches a client by identifier.
	fn fetch<'a>(&'a self, id: &'a ClientId) -> StoreFuture<'a, Option<Client>>;

	/// Registers a new client.
	fn create(&self, client: Client) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`TokenStore`] and [`ClientStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Uniqueness violation on create.
	#[error("{} value is already in use.", .kind.label())]
	Conflict {
		/// Table the conflicting write targeted.
		kind: TokenKind,
	},
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn conflict_names_the_token_kind() {
		let err = StoreError::Conflict { kind: TokenKind::RefreshToken };

		assert_eq!(err.to_string(), "Refresh token value is already in use.");
	}

	#[test]
	fn store_errors_can_be_serialized() {
		let payload = serde_json::to_string(&StoreError::Conflict { kind: TokenKind::AccessToken })
			.expect("Store error should serialize to JSON.");
		let round_trip: StoreError =
			serde_json::from_str(&payload).expect("Serialized error should deserialize from JSON.");

		assert_eq!(round_trip, StoreError::Conflict { kind: TokenKind::AccessToken });
	}
}
