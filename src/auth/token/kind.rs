//! Token kind discriminator shared by the flattened token record and the stores.

// self
use crate::_prelude::*;

/// Distinguishes the three token tables a store maintains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
	/// Short-lived bearer credential.
	AccessToken,
	/// Long-lived credential used to mint new access tokens.
	RefreshToken,
	/// Single-use code exchanged at the token endpoint.
	AuthorizationCode,
}
impl TokenKind {
	/// Every kind, in sweep order.
	pub const ALL: [TokenKind; 3] =
		[TokenKind::AccessToken, TokenKind::RefreshToken, TokenKind::AuthorizationCode];

	/// Stable machine identifier, used for metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenKind::AccessToken => "access_token",
			TokenKind::RefreshToken => "refresh_token",
			TokenKind::AuthorizationCode => "authorization_code",
		}
	}

	/// Human label used in error messages.
	pub const fn label(self) -> &'static str {
		match self {
			TokenKind::AccessToken => "Access token",
			TokenKind::RefreshToken => "Refresh token",
			TokenKind::AuthorizationCode => "Authorization code",
		}
	}
}
impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
