use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hex SHA-256 of an operator token, the form kept in configuration.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Compare a presented token against the configured digest in constant time.
pub fn verify_token(token: &str, expected_sha256: &str) -> bool {
    let Ok(expected) = hex::decode(expected_sha256) else {
        return false;
    };
    let actual = Sha256::digest(token.as_bytes());
    actual.as_slice().ct_eq(expected.as_slice()).into()
}
