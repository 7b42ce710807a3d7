//! Registered OAuth clients.

pub mod secret;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, client::secret::SecretHasher},
	random::{self, DEFAULT_TOKEN_BYTES, GenerationError},
};

/// Application registered with the authorization server.
///
/// A client without a secret is public; confidential clients keep only the hash of their
/// secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
	/// Unique client identifier.
	pub id: ClientId,
	/// Display name.
	pub name: String,
	/// Hashed secret; empty for public clients.
	#[serde(default)]
	pub secret: String,
	/// Redirect URIs the client may receive authorization codes on.
	#[serde(default)]
	pub redirect_uris: Vec<Url>,
}
impl Client {
	/// Creates a public client with a freshly generated identifier.
	pub fn new(name: impl Into<String>, redirect_uris: Vec<Url>) -> Result<Self, GenerationError> {
		let id = ClientId::from_generated(random::generate(16)?);

		Ok(Self { id, name: name.into(), secret: String::new(), redirect_uris })
	}

	/// Public clients carry no secret.
	pub fn is_public(&self) -> bool {
		self.secret.is_empty()
	}

	/// Returns `true` if `uri` is registered for this client.
	pub fn has_redirect_uri(&self, uri: &Url) -> bool {
		self.redirect_uris.iter().any(|candidate| candidate == uri)
	}

	/// Generates a new secret, stores its hash, and returns the plaintext.
	///
	/// The plaintext is not kept anywhere; hand it to the client owner right away.
	pub fn generate_secret(
		&mut self,
		hasher: &dyn SecretHasher,
	) -> Result<String, GenerationError> {
		let plaintext = random::generate(DEFAULT_TOKEN_BYTES)?;

		self.secret = hasher.hash(&plaintext);

		Ok(plaintext)
	}

	/// Verifies `secret` against the stored hash; public clients never authenticate.
	pub fn authenticate(&self, secret: &str, hasher: &dyn SecretHasher) -> bool {
		!self.is_public() && hasher.verify(secret, &self.secret)
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("secret", &if self.is_public() { "<none>" } else { "<redacted>" })
			.field("redirect_uris", &self.redirect_uris)
			.finish()
	}
}
