//! Refresh token grant (RFC 6749 §6) with optional rotation.

// self
use crate::{
	_prelude::*,
	auth::TokenKind,
	grant::{GrantFuture, GrantHandler, GrantRequest, RefreshTokenGrantConfig, TokenGrant},
	http::OauthRequest,
	issuance::{TokenBinding, TokenIssuer},
	oauth::{GrantType, OauthError},
};

const SCOPE_EXCEEDED: &str =
	"The scope of the new access token exceeds the scope(s) of the refresh token";

/// Mints new access tokens from a stored refresh token.
///
/// With rotation enabled the replacement refresh token is persisted before the presented
/// one is deleted, so a failure between the two writes never leaves the owner without a
/// usable refresh token.
#[derive(Clone, Debug, Default)]
pub struct RefreshTokenGrant {
	config: RefreshTokenGrantConfig,
}
impl RefreshTokenGrant {
	/// Creates the grant.
	pub fn new(config: RefreshTokenGrantConfig) -> Self {
		Self { config }
	}

	fn presented(request: &OauthRequest) -> Result<&str, OauthError> {
		request
			.form_value("refresh_token")
			.ok_or_else(|| OauthError::invalid_request("Missing refresh token"))
	}
}
impl GrantHandler for RefreshTokenGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::RefreshToken
	}

	fn allow_public_clients(&self) -> bool {
		true
	}

	fn validate(&self, request: &OauthRequest) -> Result<(), OauthError> {
		Self::presented(request).map(|_| ())
	}

	fn create_token<'a>(
		&'a self,
		issuer: &'a TokenIssuer,
		ctx: GrantRequest<'a>,
	) -> GrantFuture<'a, TokenGrant> {
		Box::pin(async move {
			let value = Self::presented(ctx.request)?;
			let store = issuer.store();
			let presented = store
				.fetch(TokenKind::RefreshToken, value)
				.await?
				.ok_or(Error::TokenNotFound { kind: TokenKind::RefreshToken })?;

			let caller = ctx.client.map(|client| &client.id);

			if presented.client_id.is_some() && presented.client_id.as_ref() != caller {
				return Err(
					OauthError::invalid_grant("Refresh token was issued to another client").into()
				);
			}

			let requested = ctx.requested_scope();
			let now = OffsetDateTime::now_utc();

			if !presented.is_valid_at(&requested, now) {
				let err = if presented.is_expired_at(now) {
					OauthError::invalid_grant("Refresh token has expired")
				} else {
					OauthError::invalid_scope(SCOPE_EXCEEDED)
				};

				return Err(err.into());
			}

			let scope = if requested.is_empty() { presented.scope.clone() } else { requested };
			let binding = TokenBinding {
				client_id: presented.client_id.as_ref(),
				owner: presented.owner.as_ref(),
				scope: &scope,
			};
			let access_token =
				issuer.create_access_token(binding, self.config.access_token_ttl).await?;

			if !self.config.rotate_refresh_tokens {
				return Ok(TokenGrant {
					grant_type: GrantType::RefreshToken,
					access_token,
					refresh_token: Some(presented),
				});
			}

			let rotated = issuer
				.create_refresh_token(
					TokenBinding { scope: &presented.scope, ..binding },
					self.config.refresh_token_ttl,
				)
				.await?;

			if self.config.revoke_rotated_refresh_tokens {
				store.delete(TokenKind::RefreshToken, presented.value.expose()).await?;
			}

			Ok(TokenGrant {
				grant_type: GrantType::RefreshToken,
				access_token,
				refresh_token: Some(rotated),
			})
		})
	}
}
