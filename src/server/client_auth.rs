//! Client authentication for the token endpoint.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{Client, ClientId, ScopeSet},
	http::OauthRequest,
	oauth::OauthError,
	server::Server,
};

const AUTHORIZATION_HEADER: &str = "Authorization";

/// Credentials presented by the caller.
struct Credentials {
	id: String,
	secret: String,
}
impl Credentials {
	/// Basic header first, then the `client_id`/`client_secret` form fields.
	fn extract(request: &OauthRequest) -> Result<Self, OauthError> {
		if let Some(header) = request.header(AUTHORIZATION_HEADER) {
			return Self::from_basic(header);
		}

		Ok(Self {
			id: request.form_value("client_id").unwrap_or_default().to_owned(),
			secret: request.form_value("client_secret").unwrap_or_default().to_owned(),
		})
	}

	fn from_basic(header: &str) -> Result<Self, OauthError> {
		let malformed = || OauthError::invalid_request("Authorization header is malformed");
		let (scheme, payload) = header.trim().split_once(' ').ok_or_else(malformed)?;

		if !scheme.eq_ignore_ascii_case("Basic") {
			return Err(malformed());
		}

		let decoded = STANDARD.decode(payload.trim()).map_err(|_| malformed())?;
		let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;
		let (id, secret) = decoded.split_once(':').ok_or_else(malformed)?;

		Ok(Self { id: id.to_owned(), secret: secret.to_owned() })
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("id", &self.id)
			.field("secret", &"<redacted>")
			.finish()
	}
}

impl Server {
	/// Authenticates the caller of the token endpoint.
	///
	/// Returns `Ok(None)` for an anonymous caller of a grant that accepts public clients; the
	/// client store is not consulted in that case.
	pub(crate) async fn authenticate_client(
		&self,
		request: &OauthRequest,
		allow_public_clients: bool,
	) -> Result<Option<Client>> {
		let credentials = Credentials::extract(request)?;

		if !allow_public_clients && credentials.secret.is_empty() {
			return Err(OauthError::invalid_client("Client secret is missing").into());
		}
		if allow_public_clients && credentials.id.is_empty() {
			return Ok(None);
		}

		let failed = || OauthError::invalid_client("Client authentication failed");
		let id = ClientId::new(&credentials.id).map_err(|_| failed())?;
		let client = self.clients.fetch(&id).await?.ok_or_else(failed)?;

		let verified = if client.is_public() {
			allow_public_clients && credentials.secret.is_empty()
		} else {
			client.authenticate(&credentials.secret, self.hasher.as_ref())
		};

		if !verified {
			return Err(failed().into());
		}

		let authorized = match &self.callbacks.client_authorizer {
			Some(authorizer) => authorizer(&client.id, &credentials.secret)?,
			None => true,
		};

		if !authorized {
			return Err(failed().into());
		}

		Ok(Some(client))
	}

	/// Asks the scope authorizer whether `client` may request the `scope` form field.
	///
	/// Requests without a `scope` field skip the check.
	pub(crate) fn authorize_client_scope(
		&self,
		request: &OauthRequest,
		client: Option<&Client>,
	) -> Result<()> {
		let (Some(authorizer), Some(raw)) =
			(&self.callbacks.client_scope_authorizer, request.form_value("scope"))
		else {
			return Ok(());
		};

		if authorizer(client, &ScopeSet::parse(raw))? {
			Ok(())
		} else {
			Err(OauthError::invalid_scope("Client not allowed to access provided scope").into())
		}
	}
}
