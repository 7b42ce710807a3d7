//! Resource owner password credentials grant (RFC 6749 §4.3).

// self
use crate::{
	_prelude::*,
	auth::{Client, OwnerId},
	grant::{GrantFuture, GrantHandler, GrantRequest, PasswordGrantConfig, TokenGrant},
	http::OauthRequest,
	issuance::{TokenBinding, TokenIssuer},
	oauth::{GrantType, OauthError},
};

/// Checks a username/password pair against the host's identity store.
///
/// `Ok(None)` means the credentials were rejected; `Err` is an infrastructure failure.
pub trait PasswordVerifier: Send + Sync {
	/// Resolves the owner behind `username` if `password` matches.
	fn verify<'a>(
		&'a self,
		username: &'a str,
		password: &'a str,
	) -> GrantFuture<'a, Option<OwnerId>>;
}
impl<F> PasswordVerifier for F
where
	F: Fn(&str, &str) -> Result<Option<OwnerId>> + Send + Sync,
{
	fn verify<'a>(
		&'a self,
		username: &'a str,
		password: &'a str,
	) -> GrantFuture<'a, Option<OwnerId>> {
		let outcome = self(username, password);

		Box::pin(async move { outcome })
	}
}

/// Exchanges a resource owner's username and password for tokens.
#[derive(Clone)]
pub struct PasswordGrant {
	verifier: Arc<dyn PasswordVerifier>,
	config: PasswordGrantConfig,
}
impl PasswordGrant {
	/// Creates the grant around the host's credential verifier.
	pub fn new(verifier: Arc<dyn PasswordVerifier>, config: PasswordGrantConfig) -> Self {
		Self { verifier, config }
	}

	fn credentials(request: &OauthRequest) -> Result<(&str, &str), OauthError> {
		match (request.form_value("username"), request.form_value("password")) {
			(Some(username), Some(password)) => Ok((username, password)),
			_ => Err(OauthError::invalid_request("Missing username and/or password")),
		}
	}
}
impl Debug for PasswordGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PasswordGrant").field("config", &self.config).finish_non_exhaustive()
	}
}
impl GrantHandler for PasswordGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::Password
	}

	fn allow_public_clients(&self) -> bool {
		true
	}

	fn validate(&self, request: &OauthRequest) -> Result<(), OauthError> {
		Self::credentials(request).map(|_| ())
	}

	fn identifier(&self, request: &OauthRequest, _client: Option<&Client>) -> String {
		request.form_value("username").unwrap_or_default().to_owned()
	}

	fn create_token<'a>(
		&'a self,
		issuer: &'a TokenIssuer,
		ctx: GrantRequest<'a>,
	) -> GrantFuture<'a, TokenGrant> {
		Box::pin(async move {
			let (username, password) = Self::credentials(ctx.request)?;
			let owner = self
				.verifier
				.verify(username, password)
				.await?
				.ok_or_else(|| OauthError::access_denied("Invalid username and/or password"))?;
			let scope = ctx.requested_scope();
			let binding = TokenBinding {
				client_id: ctx.client.map(|client| &client.id),
				owner: Some(&owner),
				scope: &scope,
			};
			let access_token =
				issuer.create_access_token(binding, self.config.access_token_ttl).await?;
			let refresh_token = if self.config.generate_refresh_token {
				Some(issuer.create_refresh_token(binding, self.config.refresh_token_ttl).await?)
			} else {
				None
			};

			Ok(TokenGrant { grant_type: GrantType::Password, access_token, refresh_token })
		})
	}
}
