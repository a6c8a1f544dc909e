//! Bodies of `@streaming` blob payloads.
//!
//! Transport is out of scope, so a stream is fully buffered: generated code moves it in and out of an HTTP message
//! body without base64 encoding. A missing stream is an empty one, which is why streaming members are never
//! optional.

use crate::blob::Blob;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteStream {
    inner: Vec<u8>,
}

impl ByteStream {
    pub fn new<T: Into<Vec<u8>>>(input: T) -> Self {
        ByteStream { inner: input.into() }
    }

    pub fn from_static(bytes: &'static [u8]) -> Self {
        ByteStream::new(bytes)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Read the whole stream into a [`Blob`].
    pub fn collect(self) -> Blob {
        Blob::new(self.inner)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner
    }
}

impl AsRef<[u8]> for ByteStream {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(inner: Vec<u8>) -> Self {
        ByteStream { inner }
    }
}

impl From<&[u8]> for ByteStream {
    fn from(bytes: &[u8]) -> Self {
        ByteStream::new(bytes)
    }
}

impl From<&str> for ByteStream {
    fn from(text: &str) -> Self {
        ByteStream::new(text)
    }
}

impl From<Blob> for ByteStream {
    fn from(blob: Blob) -> Self {
        ByteStream::new(blob.into_inner())
    }
}
