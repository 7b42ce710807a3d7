//! Token endpoint dispatch.

// self
use crate::{
	_prelude::*,
	grant::{GrantRequest, TokenGrant},
	http::{OauthRequest, OauthResponse},
	oauth::{GrantType, OauthError},
	obs::{self, GrantOutcome, GrantSpan},
	server::Server,
};

impl Server {
	/// Handles a token endpoint request and renders the JSON response.
	pub async fn handle_token_request(&self, request: &OauthRequest) -> OauthResponse {
		match self.grant(request).await {
			Ok(grant) => OauthResponse::token(&grant.response()),
			Err(e) => OauthResponse::error(&e),
		}
	}

	/// Runs the grant named by `grant_type` and returns the issued tokens.
	///
	/// Hosts that render their own token response call this instead of
	/// [`handle_token_request`](Self::handle_token_request).
	pub async fn grant(&self, request: &OauthRequest) -> Result<TokenGrant, OauthError> {
		let raw = request
			.form_value("grant_type")
			.ok_or_else(|| OauthError::invalid_request("No grant type was found in the request"))?;
		let grant_type = GrantType::from_str(raw)?;
		let span = GrantSpan::new(grant_type, "token");

		obs::record_grant_outcome(grant_type, GrantOutcome::Attempt);

		let outcome = span.instrument(self.dispatch(grant_type, request)).await;

		match outcome {
			Ok(grant) => {
				obs::record_grant_outcome(grant_type, GrantOutcome::Success);

				Ok(grant)
			},
			Err(e) => {
				obs::record_grant_outcome(grant_type, GrantOutcome::Failure);

				Err(self.translator.translate(&e))
			},
		}
	}

	async fn dispatch(&self, grant_type: GrantType, request: &OauthRequest) -> Result<TokenGrant> {
		let handler = self.handler(grant_type)?;

		handler.validate(request)?;

		let client = self.authenticate_client(request, handler.allow_public_clients()).await?;

		self.authorize_client_scope(request, client.as_ref())?;

		let identifier = handler.identifier(request, client.as_ref());
		let ip = self.ip(request);

		if let Some(pre_grant) = &self.callbacks.pre_grant {
			pre_grant(&identifier, &ip)?;
		}

		let ctx = GrantRequest { request, client: client.as_ref(), owner: None, ip: &ip };
		let outcome = handler.create_token(&self.issuer, ctx).await;

		if let Some(post_grant) = &self.callbacks.post_grant {
			let token = match &outcome {
				Ok(grant) => grant.access_token.value.expose(),
				Err(_) => "",
			};

			post_grant(&identifier, &ip, token);
		}

		outcome
	}
}
