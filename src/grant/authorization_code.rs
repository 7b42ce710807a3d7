//! Authorization code grant (RFC 6749 §4.1), without PKCE.

// self
use crate::{
	_prelude::*,
	auth::{Client, OauthToken, TokenKind},
	grant::{AuthorizationCodeGrantConfig, GrantFuture, GrantHandler, GrantRequest, TokenGrant},
	http::OauthRequest,
	issuance::{TokenBinding, TokenIssuer},
	oauth::{GrantType, OauthError, ResponseType},
};

/// Issues single-use codes at the authorize endpoint and exchanges them for tokens.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationCodeGrant {
	config: AuthorizationCodeGrantConfig,
}
impl AuthorizationCodeGrant {
	/// Creates the grant.
	pub fn new(config: AuthorizationCodeGrantConfig) -> Self {
		Self { config }
	}

	fn code(request: &OauthRequest) -> Result<&str, OauthError> {
		request
			.form_value("code")
			.ok_or_else(|| OauthError::invalid_request("Missing authorization code"))
	}

	/// Resolves the redirect URI: an explicit value must be registered, an absent one is
	/// implied only when the client registered exactly one.
	fn redirect_uri(request: &OauthRequest, client: &Client) -> Result<Url, OauthError> {
		match request.form_value("redirect_uri") {
			Some(raw) => {
				let uri = Url::parse(raw)
					.map_err(|_| OauthError::invalid_request("Redirect URI is malformed"))?;

				if client.has_redirect_uri(&uri) {
					Ok(uri)
				} else {
					Err(OauthError::invalid_request(
						"Redirect URI is not registered for this client",
					))
				}
			},
			None => match client.redirect_uris.as_slice() {
				[only] => Ok(only.clone()),
				_ => Err(OauthError::invalid_request("Missing redirect URI")),
			},
		}
	}
}
impl GrantHandler for AuthorizationCodeGrant {
	fn grant_type(&self) -> GrantType {
		GrantType::AuthorizationCode
	}

	fn response_type(&self) -> Option<ResponseType> {
		Some(ResponseType::Code)
	}

	fn allow_public_clients(&self) -> bool {
		true
	}

	fn validate(&self, request: &OauthRequest) -> Result<(), OauthError> {
		Self::code(request).map(|_| ())
	}

	fn create_authorization_code<'a>(
		&'a self,
		issuer: &'a TokenIssuer,
		ctx: GrantRequest<'a>,
	) -> GrantFuture<'a, OauthToken> {
		Box::pin(async move {
			let client =
				ctx.client.ok_or_else(|| OauthError::invalid_request("Missing client identifier"))?;
			let owner = ctx
				.owner
				.ok_or_else(|| OauthError::access_denied("The resource owner denied the request"))?;
			let redirect_uri = Self::redirect_uri(ctx.request, client)?;
			let explicit = ctx.request.form_value("redirect_uri").is_some();
			let scope = ctx.requested_scope();
			let binding =
				TokenBinding { client_id: Some(&client.id), owner: Some(owner), scope: &scope };

			issuer
				.create_authorization_code(
					binding,
					self.config.authorization_code_ttl,
					redirect_uri,
					explicit,
				)
				.await
		})
	}

	fn create_token<'a>(
		&'a self,
		issuer: &'a TokenIssuer,
		ctx: GrantRequest<'a>,
	) -> GrantFuture<'a, TokenGrant> {
		Box::pin(async move {
			let value = Self::code(ctx.request)?;
			let store = issuer.store();
			let code = store
				.fetch(TokenKind::AuthorizationCode, value)
				.await?
				.ok_or(Error::TokenNotFound { kind: TokenKind::AuthorizationCode })?;

			if code.is_expired() {
				return Err(OauthError::invalid_grant("Authorization code has expired").into());
			}
			if code.client_id.is_some() && code.client_id.as_ref() != ctx.client.map(|c| &c.id) {
				return Err(OauthError::invalid_grant(
					"Authorization code was issued to another client",
				)
				.into());
			}
			match ctx.request.form_value("redirect_uri") {
				Some(raw) => {
					let matches = Url::parse(raw).ok().as_ref() == code.redirect_uri.as_ref();

					if !matches {
						return Err(OauthError::invalid_grant(
							"Redirect URI does not match the authorization request",
						)
						.into());
					}
				},
				None if code.redirect_uri_explicit => {
					return Err(OauthError::invalid_grant(
						"Redirect URI is required because the authorization request included one",
					)
					.into());
				},
				None => {},
			}
			if !store.delete(TokenKind::AuthorizationCode, value).await? {
				return Err(Error::TokenNotFound { kind: TokenKind::AuthorizationCode });
			}

			let binding = TokenBinding {
				client_id: code.client_id.as_ref(),
				owner: code.owner.as_ref(),
				scope: &code.scope,
			};
			let access_token =
				issuer.create_access_token(binding, self.config.access_token_ttl).await?;
			let refresh_token = if self.config.generate_refresh_token {
				Some(issuer.create_refresh_token(binding, self.config.refresh_token_ttl).await?)
			} else {
				None
			};

			Ok(TokenGrant { grant_type: GrantType::AuthorizationCode, access_token, refresh_token })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{OwnerId, Sha256SecretHasher},
		error::ErrorKind,
		issuance::IssuanceConfig,
		oauth::ErrorCode,
		store::MemoryStore,
	};

	const CALLBACK: &str = "https://app.example.com/callback";

	fn client(redirects: &[&str]) -> Client {
		let uris = redirects
			.iter()
			.map(|raw| Url::parse(raw).expect("Redirect fixture should parse."))
			.collect();
		let mut client = Client::new("web", uris).expect("Client should be created.");

		client.generate_secret(&Sha256SecretHasher).expect("Secret should be generated.");

		client
	}

	async fn authorize(
		issuer: &TokenIssuer,
		client: &Client,
		body: &str,
	) -> Result<OauthToken> {
		let request = OauthRequest::from_form_urlencoded(body);
		let owner = OwnerId::new("owner-1");
		let ctx =
			GrantRequest { request: &request, client: Some(client), owner: Some(&owner), ip: "" };

		AuthorizationCodeGrant::default().create_authorization_code(issuer, ctx).await
	}

	async fn exchange(issuer: &TokenIssuer, client: &Client, body: &str) -> Result<TokenGrant> {
		let request = OauthRequest::from_form_urlencoded(body);
		let ctx = GrantRequest { request: &request, client: Some(client), owner: None, ip: "" };

		AuthorizationCodeGrant::default().create_token(issuer, ctx).await
	}

	#[tokio::test]
	async fn single_registered_redirect_is_implied() {
		let issuer = TokenIssuer::new(Arc::new(MemoryStore::default()), IssuanceConfig::default());
		let client = client(&[CALLBACK]);
		let code = authorize(&issuer, &client, "response_type=code&scope=read")
			.await
			.expect("Code should be issued.");

		assert_eq!(code.redirect_uri.as_ref().map(Url::as_str), Some(CALLBACK));
		assert_eq!(code.owner, Some(OwnerId::new("owner-1")));
	}

	#[tokio::test]
	async fn unregistered_or_ambiguous_redirects_are_rejected() {
		let issuer = TokenIssuer::new(Arc::new(MemoryStore::default()), IssuanceConfig::default());
		let two = client(&[CALLBACK, "https://app.example.com/other"]);
		let ambiguous = authorize(&issuer, &two, "response_type=code")
			.await
			.expect_err("Several registrations need an explicit redirect URI.");
		let foreign = authorize(&issuer, &two, "redirect_uri=https%3A%2F%2Fevil.example.com%2F")
			.await
			.expect_err("Unregistered redirect URIs must be rejected.");

		assert!(matches!(ambiguous, Error::Oauth(ref e) if e.code == ErrorCode::InvalidRequest));
		assert!(matches!(foreign, Error::Oauth(ref e) if e.code == ErrorCode::InvalidRequest));
	}

	#[tokio::test]
	async fn codes_are_single_use() {
		let store = MemoryStore::default();
		let issuer = TokenIssuer::new(Arc::new(store.clone()), IssuanceConfig::default());
		let client = client(&[CALLBACK]);
		let code = authorize(&issuer, &client, "scope=read").await.expect("Code should be issued.");
		let body = format!("code={}", code.value.expose());
		let grant =
			exchange(&issuer, &client, &body).await.expect("First exchange should succeed.");

		assert_eq!(grant.access_token.scope.normalized(), "read");
		assert_eq!(grant.access_token.owner, Some(OwnerId::new("owner-1")));
		assert!(grant.refresh_token.is_some());
		assert!(store.is_empty(TokenKind::AuthorizationCode));

		let replay =
			exchange(&issuer, &client, &body).await.expect_err("Replayed codes must be rejected.");

		assert_eq!(replay.kind(), ErrorKind::AuthorizationCodeNotFound);
	}

	#[tokio::test]
	async fn exchange_checks_client_and_redirect_binding() {
		let store = MemoryStore::default();
		let issuer = TokenIssuer::new(Arc::new(store.clone()), IssuanceConfig::default());
		let owner = client(&[CALLBACK]);
		let other = client(&[CALLBACK]);
		let code = authorize(&issuer, &owner, "").await.expect("Code should be issued.");
		let stolen = exchange(&issuer, &other, &format!("code={}", code.value.expose()))
			.await
			.expect_err("Codes are bound to their client.");
		let redirected = exchange(
			&issuer,
			&owner,
			&format!("code={}&redirect_uri=https%3A%2F%2Fapp.example.com%2Fx", code.value.expose()),
		)
		.await
		.expect_err("Codes are bound to their redirect URI.");

		assert!(matches!(stolen, Error::Oauth(ref e) if e.code == ErrorCode::InvalidGrant));
		assert!(matches!(redirected, Error::Oauth(ref e) if e.code == ErrorCode::InvalidGrant));
		assert!(!store.is_empty(TokenKind::AuthorizationCode));
	}

	#[tokio::test]
	async fn explicit_redirects_must_be_repeated_on_exchange() {
		let store = MemoryStore::default();
		let issuer = TokenIssuer::new(Arc::new(store.clone()), IssuanceConfig::default());
		let client = client(&[CALLBACK]);
		let code = authorize(
			&issuer,
			&client,
			"redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback",
		)
		.await
		.expect("Code should be issued.");

		assert!(code.redirect_uri_explicit);

		let omitted = exchange(&issuer, &client, &format!("code={}", code.value.expose()))
			.await
			.expect_err("An explicit redirect URI must be repeated.");

		assert!(matches!(
			omitted,
			Error::Oauth(ref e) if e.code == ErrorCode::InvalidGrant
				&& e.description
					== "Redirect URI is required because the authorization request included one"
		));
		assert!(!store.is_empty(TokenKind::AuthorizationCode));

		let grant = exchange(
			&issuer,
			&client,
			&format!(
				"code={}&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback",
				code.value.expose()
			),
		)
		.await
		.expect("Repeating the redirect URI should succeed.");

		assert_eq!(grant.access_token.owner, Some(OwnerId::new("owner-1")));
	}
}
