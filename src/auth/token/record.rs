//! Flattened token record shared by access tokens, refresh tokens, and authorization codes.

// self
use crate::{
	_prelude::*,
	auth::{
		ClientId, OwnerId, ScopeSet,
		scope::match_scopes,
		token::{kind::TokenKind, secret::TokenSecret},
	},
};

/// Errors produced by [`OauthTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenBuilderError {
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Authorization codes must remember the redirect URI they were issued against.
	#[error("Authorization code requires a redirect URI.")]
	MissingRedirectUri,
	/// Issued when the relative expiry lands outside the representable date range.
	#[error("Expiry falls outside the supported date range.")]
	ExpiryOutOfRange,
}

/// Immutable record describing an issued token of any kind.
///
/// Records are never mutated after creation; rotation and revocation delete them and
/// create new ones.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OauthToken {
	/// Table the record lives in.
	pub kind: TokenKind,
	/// Opaque token value, unique within its kind.
	pub value: TokenSecret,
	/// Client the token was issued to; absent for anonymous public clients.
	pub client_id: Option<ClientId>,
	/// Resource owner the token acts for; absent for client-credentials tokens.
	pub owner: Option<OwnerId>,
	/// Normalized scopes granted to this token.
	pub scope: ScopeSet,
	/// Instant the token was minted.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry instant.
	pub expires_at: OffsetDateTime,
	/// Redirect URI an authorization code was issued against.
	pub redirect_uri: Option<Url>,
	/// Whether the authorization request named the redirect URI, in which case the exchange
	/// must repeat it.
	#[serde(default)]
	pub redirect_uri_explicit: bool,
}
impl OauthToken {
	/// Returns a builder for a token of `kind` carrying `value`.
	pub fn builder(kind: TokenKind, value: impl Into<String>) -> OauthTokenBuilder {
		OauthTokenBuilder::new(kind, TokenSecret::new(value))
	}

	/// Returns `true` once `instant` reaches the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token has expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Whole seconds remaining at `instant`, floored and never negative.
	pub fn expires_in_at(&self, instant: OffsetDateTime) -> u64 {
		(self.expires_at - instant).whole_seconds().max(0) as u64
	}

	/// Whole seconds remaining relative to the current clock.
	pub fn expires_in(&self) -> u64 {
		self.expires_in_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if every requested scope was granted to this token.
	pub fn match_scopes(&self, requested: &ScopeSet) -> bool {
		match_scopes(&self.scope, requested)
	}

	/// Expired tokens are never valid; otherwise the request must be empty or covered.
	pub fn is_valid_at(&self, requested: &ScopeSet, instant: OffsetDateTime) -> bool {
		!self.is_expired_at(instant) && (requested.is_empty() || self.match_scopes(requested))
	}

	/// [`is_valid_at`](Self::is_valid_at) against the current clock.
	pub fn is_valid(&self, requested: &ScopeSet) -> bool {
		self.is_valid_at(requested, OffsetDateTime::now_utc())
	}
}
impl Debug for OauthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OauthToken")
			.field("kind", &self.kind)
			.field("value", &"<redacted>")
			.field("client_id", &self.client_id)
			.field("owner", &self.owner)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("redirect_uri", &self.redirect_uri)
			.field("redirect_uri_explicit", &self.redirect_uri_explicit)
			.finish()
	}
}

/// Builder for [`OauthToken`].
#[derive(Clone, Debug)]
pub struct OauthTokenBuilder {
	kind: TokenKind,
	value: TokenSecret,
	client_id: Option<ClientId>,
	owner: Option<OwnerId>,
	scope: ScopeSet,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	redirect_uri: Option<Url>,
	redirect_uri_explicit: bool,
}
impl OauthTokenBuilder {
	fn new(kind: TokenKind, value: TokenSecret) -> Self {
		Self {
			kind,
			value,
			client_id: None,
			owner: None,
			scope: ScopeSet::default(),
			issued_at: None,
			expires_at: None,
			expires_in: None,
			redirect_uri: None,
			redirect_uri_explicit: false,
		}
	}

	/// Binds the token to a client.
	pub fn client_id(mut self, client_id: Option<ClientId>) -> Self {
		self.client_id = client_id;

		self
	}

	/// Binds the token to a resource owner.
	pub fn owner(mut self, owner: Option<OwnerId>) -> Self {
		self.owner = owner;

		self
	}

	/// Sets the granted scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Records the redirect URI of an authorization code.
	pub fn redirect_uri(mut self, redirect_uri: Option<Url>) -> Self {
		self.redirect_uri = redirect_uri;

		self
	}

	/// Marks the redirect URI as named by the authorization request.
	pub fn redirect_uri_explicit(mut self, explicit: bool) -> Self {
		self.redirect_uri_explicit = explicit;

		self
	}

	/// Consumes the builder and produces an [`OauthToken`].
	pub fn build(self) -> Result<OauthToken, TokenBuilderError> {
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) =>
				issued_at.checked_add(delta).ok_or(TokenBuilderError::ExpiryOutOfRange)?,
			(None, None) => return Err(TokenBuilderError::MissingExpiry),
		};

		if self.kind == TokenKind::AuthorizationCode && self.redirect_uri.is_none() {
			return Err(TokenBuilderError::MissingRedirectUri);
		}

		Ok(OauthToken {
			kind: self.kind,
			value: self.value,
			client_id: self.client_id,
			owner: self.owner,
			scope: self.scope,
			issued_at,
			expires_at,
			redirect_uri: self.redirect_uri,
			redirect_uri_explicit: self.redirect_uri_explicit,
		})
	}
}
