//! Immutable server configuration and its builder.

// self
use crate::{
	_prelude::*,
	auth::{Client, ClientId, OauthToken, ScopeSet, SecretHasher, Sha256SecretHasher},
	error::ConfigError,
	grant::GrantHandler,
	issuance::{IssuanceConfig, PrePersistHooks, TokenIssuer},
	oauth::{ErrorTranslator, GrantType, ResponseType},
	server::Server,
	store::{ClientStore, MemoryStore, TokenStore},
};

/// Runs before a grant with `(identifier, ip)`; an error vetoes the request.
pub type PreGrantCallback = Arc<dyn Fn(&str, &str) -> Result<()> + Send + Sync>;
/// Runs after a grant with `(identifier, ip, access_token)`; the token is empty on failure.
pub type PostGrantCallback = Arc<dyn Fn(&str, &str, &str) + Send + Sync>;
/// Extra client check with `(client_id, secret)` after the stored secret matched.
pub type ClientAuthorizer = Arc<dyn Fn(&ClientId, &str) -> Result<bool> + Send + Sync>;
/// Decides whether a client may request the given scopes.
pub type ClientScopeAuthorizer =
	Arc<dyn Fn(Option<&Client>, &ScopeSet) -> Result<bool> + Send + Sync>;

/// Host callbacks; every absent callback is a permissive no-op.
#[derive(Clone, Default)]
pub struct Callbacks {
	/// See [`PreGrantCallback`].
	pub pre_grant: Option<PreGrantCallback>,
	/// See [`PostGrantCallback`].
	pub post_grant: Option<PostGrantCallback>,
	/// Hooks run right before tokens are persisted.
	pub pre_persist: PrePersistHooks,
	/// See [`ClientAuthorizer`].
	pub client_authorizer: Option<ClientAuthorizer>,
	/// See [`ClientScopeAuthorizer`].
	pub client_scope_authorizer: Option<ClientScopeAuthorizer>,
}
impl Debug for Callbacks {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Callbacks")
			.field("pre_grant", &self.pre_grant.is_some())
			.field("post_grant", &self.post_grant.is_some())
			.field("pre_persist", &self.pre_persist)
			.field("client_authorizer", &self.client_authorizer.is_some())
			.field("client_scope_authorizer", &self.client_scope_authorizer.is_some())
			.finish()
	}
}

/// Reverse-proxy awareness for caller IP resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
	/// Trust the proxy header.
	pub behind_proxy: bool,
	/// Header carrying the original caller IP.
	pub header: String,
}
impl ProxyConfig {
	/// Header to consult, if the server sits behind a proxy.
	pub fn trusted_header(&self) -> Option<&str> {
		self.behind_proxy.then_some(self.header.as_str())
	}
}
impl Default for ProxyConfig {
	fn default() -> Self {
		Self { behind_proxy: false, header: "X-Forwarded-For".into() }
	}
}

/// Builder for [`Server`].
pub struct ServerBuilder {
	token_store: Option<Arc<dyn TokenStore>>,
	client_store: Option<Arc<dyn ClientStore>>,
	grants: HashMap<GrantType, Arc<dyn GrantHandler>>,
	callbacks: Callbacks,
	translator: ErrorTranslator,
	proxy: ProxyConfig,
	issuance: IssuanceConfig,
	hasher: Arc<dyn SecretHasher>,
}
impl ServerBuilder {
	pub(crate) fn new() -> Self {
		Self {
			token_store: None,
			client_store: None,
			grants: HashMap::new(),
			callbacks: Callbacks::default(),
			translator: ErrorTranslator::default(),
			proxy: ProxyConfig::default(),
			issuance: IssuanceConfig::default(),
			hasher: Arc::new(Sha256SecretHasher),
		}
	}

	/// Sets the token store. Required.
	pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
		self.token_store = Some(store);

		self
	}

	/// Sets the client store; an empty [`MemoryStore`] is used otherwise.
	pub fn client_store(mut self, store: Arc<dyn ClientStore>) -> Self {
		self.client_store = Some(store);

		self
	}

	/// Registers a grant handler, replacing any handler for the same grant type.
	pub fn grant<G>(mut self, handler: G) -> Self
	where
		G: 'static + GrantHandler,
	{
		self.grants.insert(handler.grant_type(), Arc::new(handler));

		self
	}

	/// Installs the pre-grant callback.
	pub fn pre_grant<F>(mut self, callback: F) -> Self
	where
		F: 'static + Fn(&str, &str) -> Result<()> + Send + Sync,
	{
		self.callbacks.pre_grant = Some(Arc::new(callback));

		self
	}

	/// Installs the post-grant callback.
	pub fn post_grant<F>(mut self, callback: F) -> Self
	where
		F: 'static + Fn(&str, &str, &str) + Send + Sync,
	{
		self.callbacks.post_grant = Some(Arc::new(callback));

		self
	}

	/// Installs the access token pre-persist hook.
	pub fn pre_persist_access_token<F>(mut self, hook: F) -> Self
	where
		F: 'static + Fn(&OauthToken) -> Result<()> + Send + Sync,
	{
		self.callbacks.pre_persist.access_token = Some(Arc::new(hook));

		self
	}

	/// Installs the refresh token pre-persist hook.
	pub fn pre_persist_refresh_token<F>(mut self, hook: F) -> Self
	where
		F: 'static + Fn(&OauthToken) -> Result<()> + Send + Sync,
	{
		self.callbacks.pre_persist.refresh_token = Some(Arc::new(hook));

		self
	}

	/// Installs the authorization code pre-persist hook.
	pub fn pre_persist_authorization_code<F>(mut self, hook: F) -> Self
	where
		F: 'static + Fn(&OauthToken) -> Result<()> + Send + Sync,
	{
		self.callbacks.pre_persist.authorization_code = Some(Arc::new(hook));

		self
	}

	/// Installs the client authorization callback.
	pub fn client_authorizer<F>(mut self, callback: F) -> Self
	where
		F: 'static + Fn(&ClientId, &str) -> Result<bool> + Send + Sync,
	{
		self.callbacks.client_authorizer = Some(Arc::new(callback));

		self
	}

	/// Installs the client scope authorization callback.
	pub fn client_scope_authorizer<F>(mut self, callback: F) -> Self
	where
		F: 'static + Fn(Option<&Client>, &ScopeSet) -> Result<bool> + Send + Sync,
	{
		self.callbacks.client_scope_authorizer = Some(Arc::new(callback));

		self
	}

	/// Replaces the error translation table.
	pub fn error_translator(mut self, translator: ErrorTranslator) -> Self {
		self.translator = translator;

		self
	}

	/// Sets reverse-proxy handling.
	pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
		self.proxy = proxy;

		self
	}

	/// Sets token generation knobs.
	pub fn issuance(mut self, issuance: IssuanceConfig) -> Self {
		self.issuance = issuance;

		self
	}

	/// Replaces the client secret hasher.
	pub fn secret_hasher(mut self, hasher: Arc<dyn SecretHasher>) -> Self {
		self.hasher = hasher;

		self
	}

	/// Freezes the configuration.
	pub fn build(self) -> Result<Server, ConfigError> {
		let token_store = self.token_store.ok_or(ConfigError::MissingTokenStore)?;
		let client_store =
			self.client_store.unwrap_or_else(|| Arc::new(MemoryStore::default()));
		let response_types = self
			.grants
			.values()
			.filter_map(|handler| handler.response_type().map(|rt| (rt, handler.grant_type())))
			.collect::<HashMap<ResponseType, GrantType>>();
		let issuer = TokenIssuer::new(token_store, self.issuance)
			.with_hooks(self.callbacks.pre_persist.clone());

		Ok(Server {
			issuer,
			clients: client_store,
			grants: Arc::new(self.grants),
			response_types: Arc::new(response_types),
			callbacks: Arc::new(self.callbacks),
			translator: Arc::new(self.translator),
			proxy: self.proxy,
			hasher: self.hasher,
		})
	}
}
impl Debug for ServerBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServerBuilder")
			.field("token_store", &self.token_store.is_some())
			.field("client_store", &self.client_store.is_some())
			.field("grants", &self.grants.keys().collect::<Vec<_>>())
			.field("callbacks", &self.callbacks)
			.field("proxy", &self.proxy)
			.field("issuance", &self.issuance)
			.finish_non_exhaustive()
	}
}
