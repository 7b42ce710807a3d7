//! Client secret hashing with constant-time verification.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Opaque hash/verify pair used for client secrets.
///
/// Hosts plug in their own primitive (bcrypt, argon2, ...) by implementing this trait.
pub trait SecretHasher: Send + Sync {
	/// Derives the stored representation of `plaintext`.
	fn hash(&self, plaintext: &str) -> String;

	/// Returns `true` if `plaintext` matches the stored `hash`.
	fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Default hasher: SHA-256 digest encoded as standard base64.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256SecretHasher;
impl SecretHasher for Sha256SecretHasher {
	fn hash(&self, plaintext: &str) -> String {
		STANDARD.encode(Sha256::digest(plaintext.as_bytes()))
	}

	fn verify(&self, plaintext: &str, hash: &str) -> bool {
		self.hash(plaintext).as_bytes().ct_eq(hash.as_bytes()).into()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn verify_accepts_only_the_original_secret() {
		let hasher = Sha256SecretHasher;
		let hash = hasher.hash("s3cret");

		assert_ne!(hash, "s3cret");
		assert!(hasher.verify("s3cret", &hash));
		assert!(!hasher.verify("s3cret ", &hash));
		assert!(!hasher.verify("", &hash));
	}
}
