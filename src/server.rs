//! Grant dispatcher: the entry point hosts call for the token and authorize endpoints.

pub mod config;
pub mod sweeper;

mod authorize;
mod client_auth;
mod token;

pub use config::*;
pub use sweeper::*;

// crates.io
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	auth::{Client, SecretHasher},
	grant::GrantHandler,
	issuance::TokenIssuer,
	http::OauthRequest,
	oauth::{ErrorCode, ErrorTranslator, GrantType, OauthError, ResponseType},
	store::{ClientStore, TokenStore},
};

/// OAuth 2.0 authorization server.
///
/// Cloning is cheap; every clone shares the same stores and configuration, which never
/// change after [`ServerBuilder::build`].
#[derive(Clone)]
pub struct Server {
	issuer: TokenIssuer,
	clients: Arc<dyn ClientStore>,
	grants: Arc<HashMap<GrantType, Arc<dyn GrantHandler>>>,
	response_types: Arc<HashMap<ResponseType, GrantType>>,
	callbacks: Arc<Callbacks>,
	translator: Arc<ErrorTranslator>,
	proxy: ProxyConfig,
	hasher: Arc<dyn SecretHasher>,
}
impl Server {
	/// Starts a new [`ServerBuilder`].
	pub fn builder() -> ServerBuilder {
		ServerBuilder::new()
	}

	/// Token store tokens are persisted into.
	pub fn token_store(&self) -> Arc<dyn TokenStore> {
		self.issuer.store_handle()
	}

	/// Client registry.
	pub fn client_store(&self) -> Arc<dyn ClientStore> {
		self.clients.clone()
	}

	/// Issuance engine shared by all grants.
	pub fn issuer(&self) -> &TokenIssuer {
		&self.issuer
	}

	/// Grant types this server accepts.
	pub fn grant_types(&self) -> Vec<GrantType> {
		let mut grants = self.grants.keys().copied().collect::<Vec<_>>();

		grants.sort_by_key(|grant| grant.as_str());

		grants
	}

	/// Registers a new client and persists it.
	///
	/// Confidential clients get a freshly generated secret; its plaintext is returned once and
	/// only the hash is stored.
	pub async fn register_client(
		&self,
		name: impl Into<String>,
		redirect_uris: Vec<Url>,
		confidential: bool,
	) -> Result<(Client, Option<String>)> {
		let mut client = Client::new(name, redirect_uris)?;
		let secret = if confidential {
			Some(client.generate_secret(self.hasher.as_ref())?)
		} else {
			None
		};

		self.clients.create(client.clone()).await?;

		Ok((client, secret))
	}

	/// Builds an [`ExpirySweeper`] over this server's token store.
	pub fn sweeper(&self, interval: std::time::Duration) -> ExpirySweeper {
		ExpirySweeper::new(self.issuer.store_handle(), interval)
	}

	/// Spawns the expiry sweeper on the current tokio runtime.
	pub fn spawn_sweeper(
		&self,
		interval: std::time::Duration,
		cancel: CancellationToken,
	) -> JoinHandle<()> {
		self.sweeper(interval).spawn(cancel)
	}

	fn handler(&self, grant_type: GrantType) -> Result<&Arc<dyn GrantHandler>, OauthError> {
		self.grants.get(&grant_type).ok_or_else(|| {
			OauthError::new(
				ErrorCode::UnsupportedGrantType,
				format!("Grant type {grant_type} is not supported by this server"),
			)
		})
	}

	fn ip(&self, request: &OauthRequest) -> String {
		request.client_ip(self.proxy.trusted_header())
	}
}
impl Debug for Server {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Server")
			.field("grants", &self.grant_types())
			.field("response_types", &self.response_types)
			.field("callbacks", &self.callbacks)
			.field("translator", &self.translator)
			.field("proxy", &self.proxy)
			.finish_non_exhaustive()
	}
}
