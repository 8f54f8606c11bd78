//! Issuer keys and signatures.
//!
//! Messages carry raw key and signature bytes so that decoding never
//! depends on the signature scheme. Checking and producing signatures goes
//! through the [`Signer`] and [`SignatureVerifier`] traits, implemented
//! here for Ed25519.

use ed25519_dalek::{SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use tangle_core::define_identifier;

define_identifier! {
    /// Public key of a message issuer.
    pub struct PublicKey([u8; 32]) as "public key";
}

define_identifier! {
    /// Signature over the essence of a message.
    pub struct Signature([u8; 64]) as "signature";
}

/// Produces signatures on behalf of one issuer.
pub trait Signer {
    /// Key that verifies this signer's signatures.
    fn public_key(&self) -> PublicKey;

    /// Sign `data`.
    fn sign(&self, data: &[u8]) -> Signature;
}

/// Checks signatures of some scheme.
pub trait SignatureVerifier {
    /// Whether `signature` is valid for `data` under `public_key`. Malformed
    /// keys are reported as invalid, never as a panic.
    fn verify(&self, public_key: &PublicKey, data: &[u8], signature: &Signature) -> bool;
}

/// Ed25519 signature verification.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519;

impl SignatureVerifier for Ed25519 {
    fn verify(&self, public_key: &PublicKey, data: &[u8], signature: &Signature) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        key.verify(data, &signature).is_ok()
    }
}

impl PublicKey {
    /// Verify an Ed25519 signature made by this key.
    pub fn verify(&self, data: &[u8], signature: &Signature) -> bool {
        Ed25519.verify(self, data, signature)
    }
}

/// An Ed25519 key pair.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a key pair from the operating system's randomness.
    pub fn generate() -> Self {
        KeyPair {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Derive the key pair for a 32 byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        KeyPair {
            signing_key: SigningKey::from_bytes(seed),
        }
    }
}

impl Signer for KeyPair {
    fn public_key(&self) -> PublicKey {
        PublicKey::new(self.signing_key.verifying_key().to_bytes())
    }

    fn sign(&self, data: &[u8]) -> Signature {
        Signature::new(ed25519_dalek::Signer::sign(&self.signing_key, data).to_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let key_pair = KeyPair::generate();
        let signature = key_pair.sign(b"essence");

        assert!(key_pair.public_key().verify(b"essence", &signature));
        assert!(!key_pair.public_key().verify(b"other", &signature));
        assert!(!KeyPair::generate().public_key().verify(b"essence", &signature));
    }

    #[test]
    fn test_seed_is_deterministic() {
        let first = KeyPair::from_seed(&[7; 32]);
        let second = KeyPair::from_seed(&[7; 32]);
        assert_eq!(first.public_key(), second.public_key());
        assert_eq!(first.sign(b"x"), second.sign(b"x"));
    }

    #[test]
    fn test_malformed_key_is_invalid() {
        // y = 2 is not the encoding of a curve point.
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        let key = PublicKey::new(bytes);
        assert!(!key.verify(b"data", &Signature::EMPTY));
        assert!(!Ed25519.verify(&PublicKey::EMPTY, b"data", &Signature::random()));
    }

    #[test]
    fn test_debug_hides_secret() {
        let key_pair = KeyPair::from_seed(&[1; 32]);
        let rendered = format!("{key_pair:?}");
        assert!(rendered.contains(&key_pair.public_key().base58()));
        assert!(rendered.ends_with(".. }"));
    }
}
