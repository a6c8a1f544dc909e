//! Runtime support for Rust code generated by `shapegen`.
//!
//! Generated crates never reimplement wire primitives. They reference the items in this crate by fully-qualified
//! path: timestamps ([`Instant`]), binary values ([`Blob`], [`ByteStream`]), untyped documents ([`Document`]), the
//! shared error taxonomy, a minimal HTTP message model, and the protocol helpers the generated serializers call
//! into. [`protocol_test`] holds the assertions used by generated conformance tests.
//!
//! ## Features
//!
//! - `json`: serde adapters and generic error parsing for the JSON protocols.
//! - `xml`: the scoped XML decoder and wrapped-error parsing for restXml.
//!
//! ## See also
//! - `shapegen::codegen::runtime` for the generator-side catalogue of these items

#![deny(clippy::unwrap_used)]
#![forbid(unsafe_code)]

pub mod base64;
pub mod blob;
pub mod byte_stream;
pub mod document;
pub mod error;
pub mod header;
pub mod http;
pub mod instant;
pub mod label;
pub mod protocol_test;
pub mod query;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "xml")]
pub mod xml;

pub use blob::Blob;
pub use byte_stream::ByteStream;
pub use document::{Document, Number};
pub use error::{BuildError, GenericError};
pub use instant::Instant;
