//! Standard-alphabet base64, as used for blobs in JSON bodies, XML text and headers.

use ::base64::Engine as _;
use ::base64::engine::general_purpose::STANDARD;

pub use ::base64::DecodeError;

/// Encode bytes with the standard padded alphabet.
pub fn encode(input: impl AsRef<[u8]>) -> String {
    STANDARD.encode(input)
}

/// Decode a standard padded base64 string.
pub fn decode(input: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(input)
}
