//! Crate-level error types shared across grants, issuance, and stores.

// self
use crate::{
	_prelude::*,
	auth::{TokenBuilderError, TokenKind},
	oauth::OauthError,
	random::GenerationError,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error surfaced by grants, the issuance engine, and the dispatcher.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Failure already classified as an OAuth error; rendered verbatim.
	#[error(transparent)]
	Oauth(#[from] OauthError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Random token generation failure.
	#[error(transparent)]
	Generation(#[from] GenerationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Looked-up token does not exist in its store.
	#[error("{} was not found.", .kind.label())]
	TokenNotFound {
		/// Kind of the missing token.
		kind: TokenKind,
	},
	/// A configured callback rejected the operation.
	#[error("The {hook} hook rejected the operation: {reason}.")]
	Hook {
		/// Name of the rejecting hook.
		hook: &'static str,
		/// Reason reported by the hook.
		reason: String,
	},
}
impl Error {
	/// Key used by [`ErrorTranslator`](crate::oauth::ErrorTranslator) tables.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::Oauth(_) => ErrorKind::Oauth,
			Error::Storage(_) => ErrorKind::Storage,
			Error::Generation(_) => ErrorKind::Generation,
			Error::Config(_) => ErrorKind::Config,
			Error::TokenNotFound { kind: TokenKind::AccessToken } => ErrorKind::AccessTokenNotFound,
			Error::TokenNotFound { kind: TokenKind::RefreshToken } =>
				ErrorKind::RefreshTokenNotFound,
			Error::TokenNotFound { kind: TokenKind::AuthorizationCode } =>
				ErrorKind::AuthorizationCodeNotFound,
			Error::Hook { .. } => ErrorKind::Hook,
		}
	}

	/// Builds a [`Error::Hook`] rejection.
	pub fn hook(hook: &'static str, reason: impl Display) -> Self {
		Self::Hook { hook, reason: reason.to_string() }
	}
}

/// Stable error categories used as translation-table keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
	/// Already-classified OAuth error.
	Oauth,
	/// Storage-layer failure.
	Storage,
	/// Token generation failure.
	Generation,
	/// Configuration failure.
	Config,
	/// Access token lookup found nothing.
	AccessTokenNotFound,
	/// Refresh token lookup found nothing.
	RefreshTokenNotFound,
	/// Authorization code lookup found nothing.
	AuthorizationCodeNotFound,
	/// Callback rejection.
	Hook,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The server cannot operate without a token store.
	#[error("No token store was given to the OAuth server.")]
	MissingTokenStore,
	/// A token record could not be assembled.
	#[error(transparent)]
	InvalidToken(#[from] TokenBuilderError),
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert_eq!(error.kind(), ErrorKind::Storage);
		assert!(error.to_string().contains("database unreachable"));

		let source = StdError::source(&error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn missing_tokens_map_to_kind_specific_keys() {
		let err = Error::TokenNotFound { kind: TokenKind::RefreshToken };

		assert_eq!(err.kind(), ErrorKind::RefreshTokenNotFound);
		assert_eq!(err.to_string(), "Refresh token was not found.");
		assert_eq!(
			Error::TokenNotFound { kind: TokenKind::AuthorizationCode }.kind(),
			ErrorKind::AuthorizationCodeNotFound
		);
	}
}
