//! Client credentials grant (RFC 6749 §4.4).

// self
use crate::{
	_prelude::*,
	grant::{ClientCredentialsGrantConfig, GrantFuture, GrantHandler, GrantRequest, TokenGrant},
	http::OauthRequest,
	issuance::{TokenBinding, TokenIssuer},
	oauth::{GrantType, OauthError},
};

/// Issues access tokens to confidential clients acting on their own behalf.
#[derive(Clone, Debug, Default)]
pub struct ClientCredentialsGrant {
	config: ClientCredentialsGrantConfig,
}
impl ClientCredentialsGrant {
	/// Creates the grant.
	pub fn new(config: ClientCredentialsGrantConfig) -> Self {
		Self { config }
	}
}
impl GrantHandler for ClientCredentialsGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::ClientCredentials
	}

	fn allow_public_clients(&self) -> bool {
		false
	}

	fn validate(&self, _request: &OauthRequest) -> Result<(), OauthError> {
		Ok(())
	}

	fn create_token<'a>(
		&'a self,
		issuer: &'a TokenIssuer,
		ctx: GrantRequest<'a>,
	) -> GrantFuture<'a, TokenGrant> {
		Box::pin(async move {
			let client = ctx
				.client
				.ok_or_else(|| OauthError::invalid_client("Client authentication failed"))?;
			let scope = ctx.requested_scope();
			let binding = TokenBinding { client_id: Some(&client.id), owner: None, scope: &scope };
			let access_token =
				issuer.create_access_token(binding, self.config.access_token_ttl).await?;

			Ok(TokenGrant {
				grant_type: GrantType::ClientCredentials,
				access_token,
				refresh_token: None,
			})
		})
	}
}
