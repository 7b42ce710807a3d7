//! Grant handlers: the closed set of ways to exchange credentials for tokens.
//!
//! Each handler validates its own form fields, mints tokens through the shared
//! [`TokenIssuer`], and leaves client authentication, hooks, and rendering to the dispatcher.

pub mod authorization_code;
pub mod client_credentials;
pub mod config;
pub mod password;
pub mod refresh_token;

pub use authorization_code::*;
pub use client_credentials::*;
pub use config::*;
pub use password::*;
pub use refresh_token::*;

// self
use crate::{
	_prelude::*,
	auth::{Client, OauthToken, OwnerId, ScopeSet},
	http::{OauthRequest, TokenResponse},
	issuance::TokenIssuer,
	oauth::{GrantType, OauthError, ResponseType},
};

/// Boxed future returned by grant handlers.
pub type GrantFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Everything a handler may consult for one request.
#[derive(Clone, Copy, Debug)]
pub struct GrantRequest<'a> {
	/// Parsed inbound request.
	pub request: &'a OauthRequest,
	/// Authenticated client; `None` for anonymous public clients.
	pub client: Option<&'a Client>,
	/// Resource owner approved by the host (authorize endpoint only).
	pub owner: Option<&'a OwnerId>,
	/// Resolved caller IP.
	pub ip: &'a str,
}
impl GrantRequest<'_> {
	/// Scopes requested through the `scope` form field.
	pub fn requested_scope(&self) -> ScopeSet {
		self.request.form_value("scope").map(ScopeSet::parse).unwrap_or_default()
	}
}

/// Tokens issued by one grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Grant that produced the tokens.
	pub grant_type: GrantType,
	/// Newly minted access token.
	pub access_token: OauthToken,
	/// Refresh token handed back, if any.
	pub refresh_token: Option<OauthToken>,
}
impl TokenGrant {
	/// Scope echoed to the client.
	///
	/// The refresh grant reports the refresh token's scopes; every other grant reports the
	/// access token's scopes.
	pub fn scope(&self) -> &ScopeSet {
		match (&self.grant_type, &self.refresh_token) {
			(GrantType::RefreshToken, Some(refresh)) => &refresh.scope,
			_ => &self.access_token.scope,
		}
	}

	/// Wire payload measured against `now`.
	pub fn response_at(&self, now: OffsetDateTime) -> TokenResponse {
		TokenResponse::new(&self.access_token, self.refresh_token.as_ref(), self.scope(), now)
	}

	/// Wire payload measured against the current clock.
	pub fn response(&self) -> TokenResponse {
		self.response_at(OffsetDateTime::now_utc())
	}
}

mod sealed {
	pub trait Sealed {}

	impl Sealed for super::AuthorizationCodeGrant {}
	impl Sealed for super::ClientCredentialsGrant {}
	impl Sealed for super::PasswordGrant {}
	impl Sealed for super::RefreshTokenGrant {}
}

/// Common contract of the built-in grants. The set is closed.
pub trait GrantHandler: sealed::Sealed + Send + Sync {
	/// Grant type served by this handler.
	fn grant_type(&self) -> GrantType;

	/// Response type reachable from the authorize endpoint, if any.
	fn response_type(&self) -> Option<ResponseType> {
		None
	}

	/// Whether requests without client credentials are accepted.
	fn allow_public_clients(&self) -> bool;

	/// Checks grant-specific form fields before any client lookup or callback runs.
	fn validate(&self, request: &OauthRequest) -> Result<(), OauthError>;

	/// Identifier reported to the pre/post-grant callbacks.
	///
	/// Defaults to the client id, or an empty string for anonymous clients.
	fn identifier(&self, _request: &OauthRequest, client: Option<&Client>) -> String {
		client.map(|client| client.id.to_string()).unwrap_or_default()
	}

	/// Mints an authorization code for the authorize endpoint.
	fn create_authorization_code<'a>(
		&'a self,
		_issuer: &'a TokenIssuer,
		_ctx: GrantRequest<'a>,
	) -> GrantFuture<'a, OauthToken> {
		let grant = self.grant_type();

		Box::pin(async move {
			Err(OauthError::invalid_request(format!(
				"Grant type {grant} does not support authorization"
			))
			.into())
		})
	}

	/// Mints the tokens returned by the token endpoint.
	fn create_token<'a>(
		&'a self,
		issuer: &'a TokenIssuer,
		ctx: GrantRequest<'a>,
	) -> GrantFuture<'a, TokenGrant>;
}
