//! RFC 6749 wire vocabulary: grant/response types, error codes, and the error payload.

pub mod translate;

pub use translate::*;

// self
use crate::_prelude::*;

/// OAuth 2.0 grant types understood by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Resource Owner Password Credentials grant.
	Password,
	/// Refresh Token grant.
	RefreshToken,
	/// Authorization Code grant.
	AuthorizationCode,
	/// Client Credentials grant.
	ClientCredentials,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::Password => "password",
			GrantType::RefreshToken => "refresh_token",
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::ClientCredentials => "client_credentials",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for GrantType {
	type Err = OauthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"password" => Ok(GrantType::Password),
			"refresh_token" => Ok(GrantType::RefreshToken),
			"authorization_code" => Ok(GrantType::AuthorizationCode),
			"client_credentials" => Ok(GrantType::ClientCredentials),
			other => Err(OauthError::new(
				ErrorCode::UnsupportedGrantType,
				format!("Grant type {other} is not supported by this server"),
			)),
		}
	}
}

/// Response types accepted by the authorization endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
	/// Authorization code response.
	Code,
	/// Implicit access-token response.
	Token,
}
impl ResponseType {
	/// Returns the RFC 6749 identifier for the response type.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResponseType::Code => "code",
			ResponseType::Token => "token",
		}
	}
}
impl Display for ResponseType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ResponseType {
	type Err = OauthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"code" => Ok(ResponseType::Code),
			"token" => Ok(ResponseType::Token),
			other => Err(OauthError::new(
				ErrorCode::UnsupportedResponseType,
				format!("Response type {other} is not supported by this server"),
			)),
		}
	}
}

/// Token type echoed in successful token responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
	/// RFC 6750 bearer token.
	#[default]
	Bearer,
}

/// RFC 6749 §5.2 error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	/// Malformed or missing request parameter.
	InvalidRequest,
	/// Client authentication failed.
	InvalidClient,
	/// Grant or refresh token is invalid, expired, or revoked.
	InvalidGrant,
	/// Client may not use the requested grant.
	UnauthorizedClient,
	/// Grant type is not supported.
	UnsupportedGrantType,
	/// Response type is not supported.
	UnsupportedResponseType,
	/// Requested scope exceeds what is permitted.
	InvalidScope,
	/// Resource owner or server denied the request.
	AccessDenied,
	/// Unexpected server failure.
	ServerError,
	/// Server is temporarily unable to handle the request.
	TemporarilyUnavailable,
}
impl ErrorCode {
	/// Returns the wire identifier for the code.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorCode::InvalidRequest => "invalid_request",
			ErrorCode::InvalidClient => "invalid_client",
			ErrorCode::InvalidGrant => "invalid_grant",
			ErrorCode::UnauthorizedClient => "unauthorized_client",
			ErrorCode::UnsupportedGrantType => "unsupported_grant_type",
			ErrorCode::UnsupportedResponseType => "unsupported_response_type",
			ErrorCode::InvalidScope => "invalid_scope",
			ErrorCode::AccessDenied => "access_denied",
			ErrorCode::ServerError => "server_error",
			ErrorCode::TemporarilyUnavailable => "temporarily_unavailable",
		}
	}

	/// HTTP status mandated for the code; 400 unless specified otherwise.
	pub const fn http_status(self) -> u16 {
		match self {
			ErrorCode::ServerError => 500,
			ErrorCode::TemporarilyUnavailable => 503,
			_ => 400,
		}
	}
}
impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// OAuth error payload; the only failure shape serialized to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[error("{code}: {description}")]
pub struct OauthError {
	/// Error code.
	#[serde(rename = "error")]
	pub code: ErrorCode,
	/// Human-readable description.
	#[serde(rename = "error_description")]
	pub description: String,
}
impl OauthError {
	/// Creates a new error payload.
	pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
		Self { code, description: description.into() }
	}

	/// Shorthand for [`ErrorCode::InvalidRequest`].
	pub fn invalid_request(description: impl Into<String>) -> Self {
		Self::new(ErrorCode::InvalidRequest, description)
	}

	/// Shorthand for [`ErrorCode::InvalidClient`].
	pub fn invalid_client(description: impl Into<String>) -> Self {
		Self::new(ErrorCode::InvalidClient, description)
	}

	/// Shorthand for [`ErrorCode::InvalidGrant`].
	pub fn invalid_grant(description: impl Into<String>) -> Self {
		Self::new(ErrorCode::InvalidGrant, description)
	}

	/// Shorthand for [`ErrorCode::InvalidScope`].
	pub fn invalid_scope(description: impl Into<String>) -> Self {
		Self::new(ErrorCode::InvalidScope, description)
	}

	/// Shorthand for [`ErrorCode::AccessDenied`].
	pub fn access_denied(description: impl Into<String>) -> Self {
		Self::new(ErrorCode::AccessDenied, description)
	}

	/// Shorthand for [`ErrorCode::ServerError`].
	pub fn server_error(description: impl Into<String>) -> Self {
		Self::new(ErrorCode::ServerError, description)
	}

	/// HTTP status derived from the error code.
	pub fn http_status(&self) -> u16 {
		self.code.http_status()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_mapping_follows_rfc_6749() {
		assert_eq!(ErrorCode::ServerError.http_status(), 500);
		assert_eq!(ErrorCode::TemporarilyUnavailable.http_status(), 503);

		for code in [
			ErrorCode::InvalidRequest,
			ErrorCode::InvalidClient,
			ErrorCode::InvalidGrant,
			ErrorCode::UnauthorizedClient,
			ErrorCode::UnsupportedGrantType,
			ErrorCode::UnsupportedResponseType,
			ErrorCode::InvalidScope,
			ErrorCode::AccessDenied,
		] {
			assert_eq!(code.http_status(), 400, "{code} should map to 400.");
		}
	}

	#[test]
	fn error_payload_serializes_to_wire_shape() {
		let err = OauthError::invalid_grant("Refresh token has expired");
		let payload = serde_json::to_value(&err).expect("OauthError should serialize to JSON.");

		assert_eq!(
			payload,
			serde_json::json!({
				"error": "invalid_grant",
				"error_description": "Refresh token has expired",
			})
		);
	}

	#[test]
	fn grant_type_parsing_rejects_unknown_values() {
		assert_eq!(GrantType::from_str("refresh_token"), Ok(GrantType::RefreshToken));

		let err = GrantType::from_str("implicit").expect_err("Unknown grant should be rejected.");

		assert_eq!(err.code, ErrorCode::UnsupportedGrantType);
		assert_eq!(ResponseType::from_str("code"), Ok(ResponseType::Code));
		assert_eq!(
			ResponseType::from_str("id_token").map_err(|e| e.code),
			Err(ErrorCode::UnsupportedResponseType)
		);
	}
}
