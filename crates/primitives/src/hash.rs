//! Hashing for content commitments.

use digest::Digest;
use sha2::Sha256;

use crate::buf::Buf32;

/// Double SHA-256, the host chain's standard 256-bit content hash.  Bundle
/// hashes commit to their withdrawal outputs through this.
///
/// Built on RustCrypto's `sha2` instead of going through `bitcoin_hashes`,
/// which keeps the hashing backend swappable; the test below pins the two
/// to the same output.
pub fn sha256d(buf: &[u8]) -> Buf32 {
    let mut hasher = Sha256::new();
    hasher.update(buf);
    let first = hasher.finalize_reset();
    hasher.update(first);
    Buf32::from(<[u8; 32]>::from(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use bitcoin::hashes::{sha256d as btc_sha256d, Hash};
    use rand::{rngs::OsRng, RngCore};

    use super::sha256d;
    use crate::buf::Buf32;

    #[test]
    fn test_sha256d_matches_bitcoin_hashes() {
        let mut data = [0u8; 48];
        OsRng.fill_bytes(&mut data);

        // Empty, one byte, and a full buffer all have to agree.
        for input in [&data[..0], &data[..1], &data[..]] {
            let expected = Buf32::from(btc_sha256d::Hash::hash(input).to_byte_array());
            assert_eq!(sha256d(input), expected);
        }
    }
}
