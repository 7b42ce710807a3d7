//! Authorize endpoint: turns an approved request into a redirect carrying a code.
//!
//! Consent is the host's concern. The host authenticates the resource owner, decides to
//! approve, and then calls [`Server::handle_authorization_request`] with the owner.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, OwnerId},
	grant::GrantRequest,
	http::{OauthRequest, OauthResponse},
	oauth::{ErrorCode, GrantType, OauthError, ResponseType},
	obs::{self, GrantOutcome, GrantSpan},
	server::Server,
};

impl Server {
	/// Handles an approved authorization request.
	///
	/// Success is a `302` to the client's redirect URI with `code` (and `state`, when sent)
	/// appended. Errors are rendered as JSON.
	pub async fn handle_authorization_request(
		&self,
		request: &OauthRequest,
		owner: &OwnerId,
	) -> OauthResponse {
		match self.authorize(request, owner).await {
			Ok(location) => OauthResponse::redirect(&location),
			Err(e) => OauthResponse::error(&e),
		}
	}

	/// Issues an authorization code for `owner` and returns the redirect location.
	pub async fn authorize(
		&self,
		request: &OauthRequest,
		owner: &OwnerId,
	) -> Result<Url, OauthError> {
		let raw = request.form_value("response_type").ok_or_else(|| {
			OauthError::invalid_request("No grant response type was found in request")
		})?;
		let response_type = ResponseType::from_str(raw)?;
		let grant_type = self.response_types.get(&response_type).copied().ok_or_else(|| {
			OauthError::new(
				ErrorCode::UnsupportedResponseType,
				format!("Response type {response_type} is not supported by this server"),
			)
		})?;
		let span = GrantSpan::new(grant_type, "authorize");

		obs::record_grant_outcome(grant_type, GrantOutcome::Attempt);

		match span.instrument(self.issue_code(grant_type, request, owner)).await {
			Ok(location) => {
				obs::record_grant_outcome(grant_type, GrantOutcome::Success);

				Ok(location)
			},
			Err(e) => {
				obs::record_grant_outcome(grant_type, GrantOutcome::Failure);

				Err(self.translator.translate(&e))
			},
		}
	}

	async fn issue_code(
		&self,
		grant_type: GrantType,
		request: &OauthRequest,
		owner: &OwnerId,
	) -> Result<Url> {
		let handler = self.handler(grant_type)?;
		let raw_id = request
			.form_value("client_id")
			.ok_or_else(|| OauthError::invalid_request("Missing client identifier"))?;
		let unknown = || OauthError::invalid_client("Client authentication failed");
		let client_id = ClientId::new(raw_id).map_err(|_| unknown())?;
		let client = self.clients.fetch(&client_id).await?.ok_or_else(unknown)?;
		let ip = self.ip(request);
		let ctx = GrantRequest { request, client: Some(&client), owner: Some(owner), ip: &ip };
		let code = handler.create_authorization_code(&self.issuer, ctx).await?;
		let mut location = code
			.redirect_uri
			.clone()
			.ok_or_else(|| OauthError::server_error("Authorization code has no redirect URI"))?;

		{
			let mut query = location.query_pairs_mut();

			query.append_pair("code", code.value.expose());

			if let Some(state) = request.form_value("state") {
				query.append_pair("state", state);
			}
		}

		Ok(location)
	}
}
