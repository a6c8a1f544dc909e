//! XML decoding for the restXml protocol.
//!
//! Generated parsers walk a document with [`decode::ScopedDecoder`]: each decoder is scoped to one element and hands
//! out decoders for its child elements, so a parser for a nested shape can never read past the end of its own
//! element.

pub mod decode;
pub mod errors;

pub use decode::{Document, Name, ScopedDecoder, StartEl, XmlError, expect_data};
