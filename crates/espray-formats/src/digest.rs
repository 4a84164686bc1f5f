//! SHA-256 and MD5 helpers.
//!
//! Image verification goes through [`DigestProvider`] so a host without a
//! SHA-256 implementation can report [`ParseError::DigestUnavailable`]
//! instead of a hash. The running MD5 over partition entries always uses
//! the `md5` crate.

use espray_codec::hex_string;
use sha2::{Digest, Sha256};

use crate::ParseError;

/// Size of a SHA-256 digest in bytes.
pub const SHA256_SIZE: usize = 32;

/// Size of an MD5 digest in bytes.
pub const MD5_SIZE: usize = 16;

/// Source of SHA-256 digests.
pub trait DigestProvider {
    /// Digest `data`, or fail with [`ParseError::DigestUnavailable`].
    fn sha256(&self, data: &[u8]) -> Result<[u8; SHA256_SIZE], ParseError>;
}

/// SHA-256 backed by the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha2Digest;

impl DigestProvider for Sha2Digest {
    fn sha256(&self, data: &[u8]) -> Result<[u8; SHA256_SIZE], ParseError> {
        Ok(sha256(data))
    }
}

/// A host with no digest support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDigest;

impl DigestProvider for NoDigest {
    fn sha256(&self, _data: &[u8]) -> Result<[u8; SHA256_SIZE], ParseError> {
        Err(ParseError::DigestUnavailable)
    }
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; SHA256_SIZE] {
    let mut out = [0u8; SHA256_SIZE];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex_string(&sha256(data))
}

/// MD5 of `data`.
pub fn md5(data: &[u8]) -> [u8; MD5_SIZE] {
    md5::compute(data).0
}

/// Lowercase hex MD5 of `data`.
pub fn md5_hex(data: &[u8]) -> String {
    hex_string(&md5(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_providers() {
        assert_eq!(Sha2Digest.sha256(b"abc").unwrap(), sha256(b"abc"));
        assert_eq!(NoDigest.sha256(b"abc"), Err(ParseError::DigestUnavailable));
    }
}
