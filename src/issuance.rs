//! Collision-free token minting and persistence.
//!
//! Every token flows through one minting path: generate a candidate, check the store for
//! an existing record with the same value, run the pre-persist hook, then create it. A
//! [`StoreError::Conflict`] from `create` also counts as a collision, so stores that enforce
//! uniqueness themselves close the check-then-insert race. All collisions draw from a single
//! bounded attempt budget.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, OauthToken, OwnerId, ScopeSet, TokenKind},
	error::ConfigError,
	random::{self, DEFAULT_TOKEN_BYTES, GenerationError},
	store::{StoreError, TokenStore},
};

/// Callback invoked with a fully built token right before it is persisted.
///
/// Returning an error aborts issuance; the failure is reported as `server_error`.
pub type PrePersistHook = Arc<dyn Fn(&OauthToken) -> Result<()> + Send + Sync>;

/// Knobs for the token generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuanceConfig {
	/// Random bytes per token value.
	pub token_bytes: usize,
	/// Candidate values tried before giving up.
	pub max_attempts: u32,
}
impl Default for IssuanceConfig {
	fn default() -> Self {
		Self { token_bytes: DEFAULT_TOKEN_BYTES, max_attempts: 8 }
	}
}

/// Pre-persist hooks keyed by token kind; absent hooks accept everything.
#[derive(Clone, Default)]
pub struct PrePersistHooks {
	/// Hook for access tokens.
	pub access_token: Option<PrePersistHook>,
	/// Hook for refresh tokens.
	pub refresh_token: Option<PrePersistHook>,
	/// Hook for authorization codes.
	pub authorization_code: Option<PrePersistHook>,
}
impl PrePersistHooks {
	fn run(&self, token: &OauthToken) -> Result<()> {
		let (name, hook) = match token.kind {
			TokenKind::AccessToken => ("pre_persist_access_token", &self.access_token),
			TokenKind::RefreshToken => ("pre_persist_refresh_token", &self.refresh_token),
			TokenKind::AuthorizationCode =>
				("pre_persist_authorization_code", &self.authorization_code),
		};

		match hook {
			Some(hook) => hook(token).map_err(|e| Error::hook(name, e)),
			None => Ok(()),
		}
	}
}
impl Debug for PrePersistHooks {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PrePersistHooks")
			.field("access_token", &self.access_token.is_some())
			.field("refresh_token", &self.refresh_token.is_some())
			.field("authorization_code", &self.authorization_code.is_some())
			.finish()
	}
}

/// What a new token is bound to.
#[derive(Clone, Copy, Debug)]
pub struct TokenBinding<'a> {
	/// Client the token is issued to.
	pub client_id: Option<&'a ClientId>,
	/// Resource owner the token acts for.
	pub owner: Option<&'a OwnerId>,
	/// Granted scopes.
	pub scope: &'a ScopeSet,
}

/// Mints and persists tokens; the only component that creates token records.
#[derive(Clone)]
pub struct TokenIssuer {
	store: Arc<dyn TokenStore>,
	config: IssuanceConfig,
	hooks: PrePersistHooks,
}
impl TokenIssuer {
	/// Creates an issuer persisting into `store`.
	pub fn new(store: Arc<dyn TokenStore>, config: IssuanceConfig) -> Self {
		Self { store, config, hooks: PrePersistHooks::default() }
	}

	/// Installs pre-persist hooks.
	pub fn with_hooks(mut self, hooks: PrePersistHooks) -> Self {
		self.hooks = hooks;

		self
	}

	/// Token store the issuer persists into.
	pub fn store(&self) -> &dyn TokenStore {
		self.store.as_ref()
	}

	/// Shared handle to the token store.
	pub fn store_handle(&self) -> Arc<dyn TokenStore> {
		self.store.clone()
	}

	/// Mints and persists an access token.
	pub async fn create_access_token(
		&self,
		binding: TokenBinding<'_>,
		ttl: Duration,
	) -> Result<OauthToken> {
		self.mint(TokenKind::AccessToken, binding, ttl, None, false).await
	}

	/// Mints and persists a refresh token.
	pub async fn create_refresh_token(
		&self,
		binding: TokenBinding<'_>,
		ttl: Duration,
	) -> Result<OauthToken> {
		self.mint(TokenKind::RefreshToken, binding, ttl, None, false).await
	}

	/// Mints and persists an authorization code bound to `redirect_uri`.
	///
	/// `explicit_redirect` records whether the authorization request named the URI rather
	/// than relying on the client's single registration.
	pub async fn create_authorization_code(
		&self,
		binding: TokenBinding<'_>,
		ttl: Duration,
		redirect_uri: Url,
		explicit_redirect: bool,
	) -> Result<OauthToken> {
		self.mint(TokenKind::AuthorizationCode, binding, ttl, Some(redirect_uri), explicit_redirect)
			.await
	}

	async fn mint(
		&self,
		kind: TokenKind,
		binding: TokenBinding<'_>,
		ttl: Duration,
		redirect_uri: Option<Url>,
		explicit_redirect: bool,
	) -> Result<OauthToken> {
		let issued_at = OffsetDateTime::now_utc();

		for _ in 0..self.config.max_attempts {
			let value = random::generate(self.config.token_bytes)?;

			if self.store.fetch(kind, &value).await?.is_some() {
				continue;
			}

			let token = OauthToken::builder(kind, value)
				.client_id(binding.client_id.cloned())
				.owner(binding.owner.cloned())
				.scope(binding.scope.clone())
				.issued_at(issued_at)
				.expires_in(ttl)
				.redirect_uri(redirect_uri.clone())
				.redirect_uri_explicit(explicit_redirect)
				.build()
				.map_err(ConfigError::from)?;

			self.hooks.run(&token)?;

			match self.store.create(token.clone()).await {
				Ok(()) => return Ok(token),
				Err(StoreError::Conflict { .. }) => continue,
				Err(e) => return Err(e.into()),
			}
		}

		Err(GenerationError::Exhausted { kind, attempts: self.config.max_attempts }.into())
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("config", &self.config)
			.field("hooks", &self.hooks)
			.finish_non_exhaustive()
	}
}
