//! Internal error → OAuth error translation table.

// self
use crate::{
	_prelude::*,
	error::ErrorKind,
	oauth::{ErrorCode, OauthError},
};

/// Maps internal failures to OAuth error payloads.
///
/// Errors that already carry an [`OauthError`] pass through untouched. Every other error is
/// looked up by its [`ErrorKind`]; unmapped kinds fall back to `server_error` with the
/// error's message as description. The table is built once at startup and never mutated
/// afterwards.
#[derive(Clone, Debug)]
pub struct ErrorTranslator {
	table: HashMap<ErrorKind, OauthError>,
}
impl ErrorTranslator {
	/// Creates a translator without any mapping; everything unclassified becomes `server_error`.
	pub fn empty() -> Self {
		Self { table: HashMap::new() }
	}

	/// Adds or replaces the mapping for `kind`.
	pub fn with_mapping(mut self, kind: ErrorKind, error: OauthError) -> Self {
		self.table.insert(kind, error);

		self
	}

	/// Returns the mapping registered for `kind`, if any.
	pub fn mapping(&self, kind: ErrorKind) -> Option<&OauthError> {
		self.table.get(&kind)
	}

	/// Translates an internal error into its wire representation.
	pub fn translate(&self, error: &Error) -> OauthError {
		if let Error::Oauth(inner) = error {
			return inner.clone();
		}

		match self.table.get(&error.kind()) {
			Some(mapped) => mapped.clone(),
			None => OauthError::new(ErrorCode::ServerError, error.to_string()),
		}
	}
}
impl Default for ErrorTranslator {
	fn default() -> Self {
		Self::empty()
			.with_mapping(
				ErrorKind::RefreshTokenNotFound,
				OauthError::invalid_grant("Refresh token has expired or been deleted"),
			)
			.with_mapping(
				ErrorKind::AuthorizationCodeNotFound,
				OauthError::invalid_grant("Authorization code has expired or been used"),
			)
	}
}
