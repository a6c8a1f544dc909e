//! Opaque binary values.

use crate::base64;

/// Binary data carried by `blob` shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob {
    inner: Vec<u8>,
}

impl Blob {
    pub fn new<T: Into<Vec<u8>>>(input: T) -> Self {
        Blob { inner: input.into() }
    }

    /// Decode a base64 wire value.
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        base64::decode(encoded).map(Blob::new)
    }

    pub fn to_base64(&self) -> String {
        base64::encode(&self.inner)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for Blob {
    fn from(inner: Vec<u8>) -> Self {
        Blob { inner }
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Blob::new(bytes)
    }
}
