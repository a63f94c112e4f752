use crate::determinism::json_canonical::to_canonical_bytes;
use crate::error::CoreResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// SHA-256 over the canonical JSON form; equal values give equal digests.
pub fn canonical_sha256_hex<T: Serialize>(value: &T) -> CoreResult<String> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn key_order_does_not_change_digest() {
        let a = canonical_sha256_hex(&json!({"a": 1, "b": [true, "x"]})).unwrap();
        let b = canonical_sha256_hex(&json!({"b": [true, "x"], "a": 1})).unwrap();
        assert_eq!(a, b);
    }
}
