//! Error types for the byte codec.

use thiserror::Error;

/// Error type for codec operations.
///
/// Malformed input text is never an error: characters outside an
/// encoding's alphabet are stripped. The only failure is naming an
/// encoding that does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The encoding name is not one of the six supported encodings.
    #[error("unknown encoding: {0:?} (expected one of binary, octal, decimal, hexa, text, base64)")]
    UnknownEncoding(String),
}
