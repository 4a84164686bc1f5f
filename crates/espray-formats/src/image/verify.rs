//! Appended SHA-256 ("simple hash") verification.

use espray_codec::hex_string;

use crate::digest::{DigestProvider, Sha2Digest, SHA256_SIZE};
use crate::ParseError;

/// Verify the SHA-256 trailer of a full image and return it as hex.
pub fn verify_hash(data: &[u8]) -> Result<String, ParseError> {
    verify_hash_with(data, &Sha2Digest)
}

/// [`verify_hash`] with an explicit digest provider.
///
/// The digest covers every byte before the final 32, which hold the
/// expected value.
pub fn verify_hash_with<D>(data: &[u8], digest: &D) -> Result<String, ParseError>
where
    D: DigestProvider + ?Sized,
{
    if data.len() < SHA256_SIZE {
        return Err(ParseError::too_small("image hash", SHA256_SIZE, data.len()));
    }

    let (body, trailer) = data.split_at(data.len() - SHA256_SIZE);
    let calculated = hex_string(&digest.sha256(body)?);
    let expected = hex_string(trailer);

    if calculated != expected {
        return Err(ParseError::hash_mismatch("SHA-256", calculated, expected));
    }

    Ok(calculated)
}
