//! serde adapters and error parsing for the JSON protocols (awsJson1_0, awsJson1_1, restJson1).
//!
//! Generated structures derive `Serialize`/`Deserialize` directly. Only members whose types have no serde impl of
//! their own (timestamps, blobs, documents, or collections of them) go through the adapters here, via generated
//! `serialize_with`/`deserialize_with` helpers.

pub mod de;
pub mod errors;
pub mod ser;

pub use de::{BlobDeser, DocumentDeser, InstantDateTime, InstantEpochSeconds, InstantHttpDate};
pub use ser::{BlobSer, DocumentSer, InstantSer, MapWith, SeqWith, is_boxed_none};
