//! BLAKE2b-256, the digest message identities are derived from.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

/// Length in bytes of a [`blake2b_256`] digest.
pub const DIGEST_LENGTH: usize = 32;

/// BLAKE2b digest of `data` with a 256-bit output length.
pub fn blake2b_256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut digest = [0u8; DIGEST_LENGTH];
    digest.copy_from_slice(&Blake2b::<U32>::digest(data));
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        let empty = [
            0x0e, 0x57, 0x51, 0xc0, 0x26, 0xe5, 0x43, 0xb2, 0xe8, 0xab, 0x2e, 0xb0, 0x60, 0x99,
            0xda, 0xa1, 0xd1, 0xe5, 0xdf, 0x47, 0x77, 0x8f, 0x77, 0x87, 0xfa, 0xab, 0x45, 0xcd,
            0xf1, 0x2f, 0xe3, 0xa8,
        ];
        assert_eq!(blake2b_256(b""), empty);
        assert_ne!(blake2b_256(b"\x00"), empty);
    }

    #[test]
    fn test_single_byte_changes_digest() {
        let mut message = vec![7u8; 164];
        let before = blake2b_256(&message);
        message[163] ^= 1;
        assert_ne!(blake2b_256(&message), before);
    }
}
