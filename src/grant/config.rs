//! Per-grant configuration loaded from host configuration files or built in code.

// self
use crate::_prelude::*;

const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::hours(1);
const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::hours(24);
const DEFAULT_AUTHORIZATION_CODE_TTL: Duration = Duration::minutes(10);

/// Settings for the resource owner password credentials grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordGrantConfig {
	/// Access token lifetime, in seconds when serialized.
	#[serde(with = "seconds")]
	pub access_token_ttl: Duration,
	/// Refresh token lifetime, in seconds when serialized.
	#[serde(with = "seconds")]
	pub refresh_token_ttl: Duration,
	/// Issue a refresh token next to every access token.
	pub generate_refresh_token: bool,
}
impl Default for PasswordGrantConfig {
	fn default() -> Self {
		Self {
			access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
			refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
			generate_refresh_token: true,
		}
	}
}

/// Settings for the refresh token grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshTokenGrantConfig {
	/// Access token lifetime, in seconds when serialized.
	#[serde(with = "seconds")]
	pub access_token_ttl: Duration,
	/// Lifetime of rotated refresh tokens, in seconds when serialized.
	#[serde(with = "seconds")]
	pub refresh_token_ttl: Duration,
	/// Issue a fresh refresh token on every use.
	pub rotate_refresh_tokens: bool,
	/// Delete the presented refresh token once its replacement is stored.
	pub revoke_rotated_refresh_tokens: bool,
}
impl Default for RefreshTokenGrantConfig {
	fn default() -> Self {
		Self {
			access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
			refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
			rotate_refresh_tokens: false,
			revoke_rotated_refresh_tokens: false,
		}
	}
}

/// Settings for the client credentials grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientCredentialsGrantConfig {
	/// Access token lifetime, in seconds when serialized.
	#[serde(with = "seconds")]
	pub access_token_ttl: Duration,
}
impl Default for ClientCredentialsGrantConfig {
	fn default() -> Self {
		Self { access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL }
	}
}

/// Settings for the authorization code grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationCodeGrantConfig {
	/// Authorization code lifetime, in seconds when serialized.
	#[serde(with = "seconds")]
	pub authorization_code_ttl: Duration,
	/// Access token lifetime, in seconds when serialized.
	#[serde(with = "seconds")]
	pub access_token_ttl: Duration,
	/// Refresh token lifetime, in seconds when serialized.
	#[serde(with = "seconds")]
	pub refresh_token_ttl: Duration,
	/// Issue a refresh token when a code is exchanged.
	pub generate_refresh_token: bool,
}
impl Default for AuthorizationCodeGrantConfig {
	fn default() -> Self {
		Self {
			authorization_code_ttl: DEFAULT_AUTHORIZATION_CODE_TTL,
			access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
			refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
			generate_refresh_token: true,
		}
	}
}

mod seconds {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(value.whole_seconds())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		i64::deserialize(deserializer).map(Duration::seconds)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_documented_lifetimes() {
		let password = PasswordGrantConfig::default();
		let refresh = RefreshTokenGrantConfig::default();

		assert_eq!(password.access_token_ttl, Duration::hours(1));
		assert_eq!(password.refresh_token_ttl, Duration::hours(24));
		assert!(password.generate_refresh_token);
		assert!(!refresh.rotate_refresh_tokens);
		assert!(!refresh.revoke_rotated_refresh_tokens);
		assert_eq!(
			AuthorizationCodeGrantConfig::default().authorization_code_ttl,
			Duration::minutes(10)
		);
	}

	#[test]
	fn partial_documents_fill_in_defaults() {
		let config: RefreshTokenGrantConfig = serde_json::from_str(
			r#"{ "access_token_ttl": 300, "rotate_refresh_tokens": true }"#,
		)
		.expect("Partial refresh config should deserialize.");

		assert_eq!(config.access_token_ttl, Duration::minutes(5));
		assert_eq!(config.refresh_token_ttl, Duration::hours(24));
		assert!(config.rotate_refresh_tokens);
		assert_eq!(
			serde_json::to_value(ClientCredentialsGrantConfig::default())
				.expect("Config should serialize."),
			serde_json::json!({ "access_token_ttl": 3600 })
		);
	}
}
