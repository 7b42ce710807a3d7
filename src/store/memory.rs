//! Thread-safe in-memory [`TokenStore`] and [`ClientStore`] for embedding, tests, and demos.

// self
use crate::{
	_prelude::*,
	auth::{Client, ClientId, OauthToken, TokenKind},
	store::{ClientStore, StoreError, StoreFuture, TokenStore},
};

type TokenMap = Arc<RwLock<HashMap<(TokenKind, String), OauthToken>>>;
type ClientMap = Arc<RwLock<HashMap<ClientId, Client>>>;

/// Storage backend that keeps tokens and clients in-process.
///
/// Clones share the same underlying maps.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
	tokens: TokenMap,
	clients: ClientMap,
}
impl MemoryStore {
	/// Number of stored records of `kind`.
	pub fn len(&self, kind: TokenKind) -> usize {
		self.tokens.read().keys().filter(|(k, _)| *k == kind).count()
	}

	/// Returns `true` if no record of `kind` is stored.
	pub fn is_empty(&self, kind: TokenKind) -> bool {
		self.len(kind) == 0
	}

	fn create_now(map: TokenMap, token: OauthToken) -> Result<(), StoreError> {
		let key = (token.kind, token.value.expose().to_owned());
		let mut guard = map.write();

		if guard.contains_key(&key) {
			return Err(StoreError::Conflict { kind: token.kind });
		}

		guard.insert(key, token);

		Ok(())
	}

	fn delete_expired_now(map: TokenMap, kind: TokenKind, now: OffsetDateTime) -> usize {
		let mut guard = map.write();
		let before = guard.len();

		guard.retain(|(k, _), token| *k != kind || !token.is_expired_at(now));

		before - guard.len()
	}

	fn create_client_now(map: ClientMap, client: Client) -> Result<(), StoreError> {
		let mut guard = map.write();

		if guard.contains_key(&client.id) {
			return Err(StoreError::Backend {
				message: format!("client {} is already registered", client.id),
			});
		}

		guard.insert(client.id.clone(), client);

		Ok(())
	}
}
impl TokenStore for MemoryStore {
	fn create(&self, token: OauthToken) -> StoreFuture<'_, ()> {
		let map = self.tokens.clone();

		Box::pin(async move { Self::create_now(map, token) })
	}

	fn fetch<'a>(&'a self, kind: TokenKind, value: &'a str) -> StoreFuture<'a, Option<OauthToken>> {
		let map = self.tokens.clone();

		Box::pin(async move { Ok(map.read().get(&(kind, value.to_owned())).cloned()) })
	}

	fn delete<'a>(&'a self, kind: TokenKind, value: &'a str) -> StoreFuture<'a, bool> {
		let map = self.tokens.clone();

		Box::pin(async move { Ok(map.write().remove(&(kind, value.to_owned())).is_some()) })
	}

	fn delete_expired(&self, kind: TokenKind, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		let map = self.tokens.clone();

		Box::pin(async move { Ok(Self::delete_expired_now(map, kind, now)) })
	}
}
impl ClientStore for MemoryStore {
	fn fetch<'a>(&'a self, id: &'a ClientId) -> StoreFuture<'a, Option<Client>> {
		let map = self.clients.clone();

		Box::pin(async move { Ok(map.read().get(id).cloned()) })
	}

	fn create(&self, client: Client) -> StoreFuture<'_, ()> {
		let map = self.clients.clone();

		Box::pin(async move { Self::create_client_now(map, client) })
	}
}
