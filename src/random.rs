//! Cryptographically secure opaque token generation.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
// self
use crate::{_prelude::*, auth::TokenKind};

/// Recommended minimum number of random bytes per token value.
pub const DEFAULT_TOKEN_BYTES: usize = 20;

/// Failures raised while producing token values.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum GenerationError {
	/// The operating system entropy source failed.
	#[error("Entropy source failed: {message}.")]
	Entropy {
		/// Error reported by the entropy source.
		message: String,
	},
	/// Every candidate collided with an existing value.
	#[error("Unable to generate a unique {} after {attempts} attempts.", .kind.label())]
	Exhausted {
		/// Kind of token being generated.
		kind: TokenKind,
		/// Number of attempts made.
		attempts: u32,
	},
}

/// Produces URL-safe opaque strings from `byte_len` bytes of OS entropy.
///
/// The output is base64url without padding, so 20 bytes yield 27 characters.
pub fn generate(byte_len: usize) -> Result<String, GenerationError> {
	let mut bytes = vec![0_u8; byte_len];

	OsRng
		.try_fill_bytes(&mut bytes)
		.map_err(|e| GenerationError::Entropy { message: e.to_string() })?;

	Ok(URL_SAFE_NO_PAD.encode(bytes))
}
